//! Plain-text rendering of notes and configuration.

use crate::config::{AiConfig, ProviderKind};
use crate::models::{AnalysisResult, ChatMessage, Note, PrioritizedNotes};
use std::fmt::Write as _;

/// One-line summary: status box, id, type, priority and summary.
#[must_use]
pub fn render_note_line(note: &Note) -> String {
    let check = if note.completed { "[x]" } else { "[ ]" };
    format!(
        "{check} {}  {:<9} {:<6}  {}",
        note.id,
        note.analysis.note_type.as_str(),
        note.analysis.priority.as_str(),
        note.analysis.summary
    )
}

/// Multi-line analysis block used after `add`.
#[must_use]
pub fn render_analysis(analysis: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Type:     {}", analysis.note_type);
    let _ = writeln!(out, "  Priority: {}", analysis.priority);
    let _ = writeln!(out, "  Summary:  {}", analysis.summary);
    if let Some(due) = &analysis.due_context {
        let _ = writeln!(out, "  Due:      {due}");
    }
    if !analysis.action_items.is_empty() {
        let _ = writeln!(out, "  Actions:");
        for item in &analysis.action_items {
            let _ = writeln!(out, "    - {item}");
        }
    }
    let _ = writeln!(
        out,
        "  Model:    {}",
        analysis.model.as_deref().unwrap_or("none (AI unavailable)")
    );
    out
}

/// Renders notes newest first, one per line, with creation times.
#[must_use]
pub fn render_notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes.\n".to_string();
    }
    let mut out = String::new();
    for note in notes {
        let _ = writeln!(out, "{}  {}", note.created_at_display(), render_note_line(note));
    }
    out
}

/// Renders the urgency buckets, skipping empty ones.
#[must_use]
pub fn render_prioritized(buckets: &PrioritizedNotes) -> String {
    let mut out = String::new();
    for (label, notes) in buckets.sections() {
        if notes.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{label} ({})", notes.len());
        for note in notes {
            let _ = writeln!(out, "  {}", render_note_line(note));
        }
    }
    if out.is_empty() {
        out.push_str("Nothing open.\n");
    }
    out
}

/// Renders a note's question history, oldest first.
#[must_use]
pub fn render_chat_history(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return "No questions asked yet.\n".to_string();
    }
    let mut out = String::new();
    for message in messages {
        let asked_at = i64::try_from(message.timestamp)
            .ok()
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map_or_else(
                || message.timestamp.to_string(),
                |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
            );
        let _ = writeln!(out, "{asked_at}  {}", message.id);
        let _ = writeln!(out, "  Q: {}", message.question);
        let _ = writeln!(out, "  A: {}", message.response);
    }
    out
}

/// Renders the AI configuration with API keys masked.
#[must_use]
pub fn render_ai_config(config: &AiConfig) -> String {
    let marker = |kind: ProviderKind| if config.provider == kind { "*" } else { " " };
    let mut out = String::new();
    let _ = writeln!(out, "Active provider: {}", config.provider.display_name());
    let _ = writeln!(out, "{} ollama", marker(ProviderKind::Ollama));
    let _ = writeln!(out, "    url:      {}", config.ollama.url);
    let _ = writeln!(out, "    model:    {}", config.ollama.model);
    let _ = writeln!(out, "{} gemini", marker(ProviderKind::Gemini));
    let _ = writeln!(out, "    api key:  {}", mask_key(&config.gemini.api_key));
    let _ = writeln!(out, "    model:    {}", config.gemini.model);
    let _ = writeln!(out, "{} openai", marker(ProviderKind::OpenAi));
    let _ = writeln!(out, "    base url: {}", config.openai.base_url);
    let _ = writeln!(out, "    api key:  {}", mask_key(&config.openai.api_key));
    let _ = writeln!(out, "    model:    {}", config.openai.model);
    out
}

/// Shows the last four characters of a key.
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
