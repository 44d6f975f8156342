//! Note classification produced by a model backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Maximum summary length used when a provider supplies no summary.
pub const SUMMARY_FALLBACK_CHARS: usize = 50;

/// Category assigned to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    /// Contains concrete tasks.
    Todo,
    /// General note or observation.
    #[default]
    Note,
    /// Reminder about something.
    Reminder,
    /// Idea or inspiration.
    Idea,
    /// Urgent or very important.
    Important,
}

impl NoteType {
    /// Returns all note types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Todo,
            Self::Note,
            Self::Reminder,
            Self::Idea,
            Self::Important,
        ]
    }

    /// Returns the type as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Note => "note",
            Self::Reminder => "reminder",
            Self::Idea => "idea",
            Self::Important => "important",
        }
    }

    /// Parses a note type, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Some(Self::Todo),
            "note" => Some(Self::Note),
            "reminder" => Some(Self::Reminder),
            "idea" => Some(Self::Idea),
            "important" => Some(Self::Important),
            _ => None,
        }
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency assigned to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Important but not urgent.
    #[default]
    Medium,
    /// Urgent, has a deadline.
    High,
}

impl Priority {
    /// Returns the priority as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a priority, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a single note.
///
/// `note_type` and `priority` are always populated; missing or unrecognised
/// values from a provider fall back to [`NoteType::Note`] and
/// [`Priority::Medium`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Note category.
    #[serde(rename = "type")]
    pub note_type: NoteType,
    /// Note urgency.
    pub priority: Priority,
    /// Short summary, nominally at most 50 characters.
    pub summary: String,
    /// Concrete actions extracted from the note.
    #[serde(default)]
    pub action_items: Vec<String>,
    /// Time context mentioned in the note ("by Friday").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_context: Option<String>,
    /// Model that produced the analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AnalysisResult {
    /// Returns the default classification for `note`.
    ///
    /// Used whenever a backend is unreachable or its answer cannot be parsed.
    #[must_use]
    pub fn fallback(note: &str) -> Self {
        Self {
            note_type: NoteType::Note,
            priority: Priority::Medium,
            summary: default_summary(note),
            action_items: Vec::new(),
            due_context: None,
            model: None,
        }
    }

    /// Maps a JSON object extracted from model output onto an analysis.
    ///
    /// Each field is defaulted independently: a usable `summary` survives
    /// even when `type` is missing.
    #[must_use]
    pub fn from_extracted(value: &Value, note: &str, model: Option<&str>) -> Self {
        let note_type = non_empty_str(value, "type")
            .and_then(NoteType::parse)
            .unwrap_or_default();
        let priority = non_empty_str(value, "priority")
            .and_then(Priority::parse)
            .unwrap_or_default();
        let summary = non_empty_str(value, "summary")
            .map_or_else(|| default_summary(note), str::to_string);
        let action_items = value
            .get("actionItems")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        let due_context = non_empty_str(value, "dueContext").map(str::to_string);

        Self {
            note_type,
            priority,
            summary,
            action_items,
            due_context,
            model: model.map(str::to_string),
        }
    }
}

/// Returns the first [`SUMMARY_FALLBACK_CHARS`] characters of `note`.
#[must_use]
pub fn default_summary(note: &str) -> String {
    note.chars().take(SUMMARY_FALLBACK_CHARS).collect()
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_shape() {
        let analysis = AnalysisResult::fallback("short note");
        assert_eq!(analysis.note_type, NoteType::Note);
        assert_eq!(analysis.priority, Priority::Medium);
        assert_eq!(analysis.summary, "short note");
        assert!(analysis.action_items.is_empty());
        assert!(analysis.due_context.is_none());
        assert!(analysis.model.is_none());
    }

    #[test]
    fn test_default_summary_truncates_on_char_boundary() {
        let note = "é".repeat(80);
        let summary = default_summary(&note);
        assert_eq!(summary.chars().count(), SUMMARY_FALLBACK_CHARS);
    }

    #[test]
    fn test_from_extracted_full() {
        let value = json!({
            "type": "todo",
            "priority": "high",
            "summary": "Buy milk",
            "actionItems": ["Go to store"],
            "dueContext": "tomorrow"
        });
        let analysis = AnalysisResult::from_extracted(&value, "buy milk", Some("llama3.2"));
        assert_eq!(analysis.note_type, NoteType::Todo);
        assert_eq!(analysis.priority, Priority::High);
        assert_eq!(analysis.summary, "Buy milk");
        assert_eq!(analysis.action_items, vec!["Go to store".to_string()]);
        assert_eq!(analysis.due_context.as_deref(), Some("tomorrow"));
        assert_eq!(analysis.model.as_deref(), Some("llama3.2"));
    }

    #[test]
    fn test_from_extracted_defaults_each_field() {
        let value = json!({ "type": "banana", "summary": "", "actionItems": "nope" });
        let analysis = AnalysisResult::from_extracted(&value, "remember the keys", None);
        assert_eq!(analysis.note_type, NoteType::Note);
        assert_eq!(analysis.priority, Priority::Medium);
        assert_eq!(analysis.summary, "remember the keys");
        assert!(analysis.action_items.is_empty());
        assert!(analysis.due_context.is_none());
    }

    #[test]
    fn test_from_extracted_is_case_insensitive() {
        let value = json!({ "type": "Reminder", "priority": " LOW " });
        let analysis = AnalysisResult::from_extracted(&value, "x", None);
        assert_eq!(analysis.note_type, NoteType::Reminder);
        assert_eq!(analysis.priority, Priority::Low);
    }

    #[test]
    fn test_serde_uses_original_field_names() {
        let analysis = AnalysisResult {
            due_context: Some("friday".to_string()),
            ..AnalysisResult::fallback("n")
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["type"], "note");
        assert_eq!(json["dueContext"], "friday");
        assert!(json.get("actionItems").is_some());
        assert!(json.get("model").is_none());
    }

    #[test]
    fn test_parse_roundtrips_as_str() {
        for t in NoteType::all() {
            assert_eq!(NoteType::parse(t.as_str()), Some(*t));
        }
        assert_eq!(Priority::parse("medium"), Some(Priority::Medium));
        assert_eq!(Priority::parse("urgent"), None);
    }
}
