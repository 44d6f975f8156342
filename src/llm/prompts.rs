//! Instructions sent to model backends.
//!
//! Both builders are pure: the same input always yields the same prompt.

/// Builds the note classification prompt.
///
/// Requests a JSON object with `type`, `priority`, `summary`, `actionItems`
/// and `dueContext`.
#[must_use]
pub fn build_analysis_prompt(note: &str) -> String {
    format!(
        r#"Analyze the following user note and respond ONLY in JSON format without additional comments:

{{
  "type": "todo|note|reminder|idea|important",
  "priority": "low|medium|high",
  "summary": "brief summary (max 50 characters)",
  "actionItems": ["list of specific actions if this is a task"],
  "dueContext": "time context if visible"
}}

Categorization rules:
- "todo": if it contains specific tasks to be done
- "reminder": if it's a reminder about something important
- "idea": if it's an idea or inspiration
- "important": if it sounds urgent or very important
- "note": for general notes, observations

Priority:
- "high": urgent, with deadline, very important
- "medium": important but not urgent
- "low": can wait

User note: "{note}""#
    )
}

/// Builds the prompt for a free-form question about a note.
///
/// Requests a JSON object with a single `answer` field.
#[must_use]
pub fn build_ask_prompt(note: &str, question: &str) -> String {
    format!(
        r#"You are a helpful assistant answering questions about the user's note.

Note: "{note}"

Question: {question}

Provide a helpful, concise response. Respond ONLY in JSON format without additional comments:

{{
  "answer": "your answer"
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_is_deterministic() {
        assert_eq!(
            build_analysis_prompt("buy milk"),
            build_analysis_prompt("buy milk")
        );
    }

    #[test]
    fn test_analysis_prompt_embeds_taxonomy_and_note() {
        let prompt = build_analysis_prompt("call the plumber");
        assert!(prompt.contains("todo|note|reminder|idea|important"));
        assert!(prompt.contains("low|medium|high"));
        assert!(prompt.contains("\"actionItems\""));
        assert!(prompt.contains("\"dueContext\""));
        assert!(!prompt.contains("\"model\""));
        assert!(prompt.ends_with("User note: \"call the plumber\""));
    }

    #[test]
    fn test_ask_prompt_requests_answer_field() {
        let prompt = build_ask_prompt("meeting at 5", "when is the meeting?");
        assert!(prompt.contains("Note: \"meeting at 5\""));
        assert!(prompt.contains("Question: when is the meeting?"));
        assert!(prompt.contains("\"answer\""));
        assert_eq!(prompt, build_ask_prompt("meeting at 5", "when is the meeting?"));
    }
}
