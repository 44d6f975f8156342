//! Note records and identifiers.

use super::{AnalysisResult, NoteType, Priority};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Creates a note ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh ID of the form `note-<millis>-<9 chars>`.
    #[must_use]
    pub fn generate(timestamp_ms: u64) -> Self {
        let random = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("note-{timestamp_ms}-{}", &random[..9]))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A stored note with its classification.
///
/// Field names serialize the same way as the browser app's backups so that
/// exported files can be imported in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier.
    pub id: NoteId,
    /// The note text as entered.
    pub content: String,
    /// Classification from the AI backend.
    #[serde(rename = "aiAnalysis")]
    pub analysis: AnalysisResult,
    /// Creation time (Unix epoch milliseconds).
    pub timestamp: u64,
    /// Whether the note has been marked done.
    #[serde(default)]
    pub completed: bool,
}

impl Note {
    /// Creates a new, incomplete note.
    #[must_use]
    pub fn new(content: impl Into<String>, analysis: AnalysisResult, timestamp: u64) -> Self {
        Self {
            id: NoteId::generate(timestamp),
            content: content.into(),
            analysis,
            timestamp,
            completed: false,
        }
    }

    /// Returns the creation time formatted for display.
    #[must_use]
    pub fn created_at_display(&self) -> String {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(chrono::DateTime::from_timestamp_millis)
            .map_or_else(
                || self.timestamp.to_string(),
                |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
            )
    }

    /// Case-insensitive match of `query` against the content, the summary
    /// and every action item. A blank query matches everything.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let hit = |text: &str| text.to_lowercase().contains(&query);
        hit(&self.content)
            || hit(&self.analysis.summary)
            || self.analysis.action_items.iter().any(|item| hit(item))
    }
}

/// Views offered by `list --filter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteFilter {
    /// Every incomplete note.
    #[default]
    All,
    /// Important notes and high-priority todos.
    Urgent,
    /// Reminders and medium-priority todos.
    Upcoming,
    /// Ideas.
    Ideas,
    /// Completed notes only.
    Completed,
}

impl NoteFilter {
    /// Returns the filter name as accepted on the command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Urgent => "urgent",
            Self::Upcoming => "upcoming",
            Self::Ideas => "ideas",
            Self::Completed => "completed",
        }
    }

    /// Returns true if `note` belongs in this view.
    #[must_use]
    pub fn matches(&self, note: &Note) -> bool {
        let a = &note.analysis;
        let todo_with = |priority: Priority| a.note_type == NoteType::Todo && a.priority == priority;
        match self {
            Self::Completed => note.completed,
            _ if note.completed => false,
            Self::All => true,
            Self::Urgent => a.note_type == NoteType::Important || todo_with(Priority::High),
            Self::Upcoming => a.note_type == NoteType::Reminder || todo_with(Priority::Medium),
            Self::Ideas => a.note_type == NoteType::Idea,
        }
    }
}

impl fmt::Display for NoteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "open" => Ok(Self::All),
            "urgent" => Ok(Self::Urgent),
            "upcoming" => Ok(Self::Upcoming),
            "ideas" | "idea" => Ok(Self::Ideas),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown filter '{other}' (expected all, urgent, upcoming, ideas or completed)"
            ))),
        }
    }
}

/// Incomplete notes grouped by urgency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrioritizedNotes {
    /// Important notes, then high-priority todos.
    pub urgent: Vec<Note>,
    /// Reminders, then medium-priority todos.
    pub upcoming: Vec<Note>,
    /// Low-priority todos.
    pub later: Vec<Note>,
    /// Ideas.
    pub ideas: Vec<Note>,
    /// General notes.
    pub general: Vec<Note>,
}

impl PrioritizedNotes {
    /// Buckets the incomplete notes in `notes`, preserving input order
    /// within each group.
    #[must_use]
    pub fn from_notes(notes: &[Note]) -> Self {
        let incomplete: Vec<&Note> = notes.iter().filter(|n| !n.completed).collect();
        let select = |pred: &dyn Fn(&Note) -> bool| -> Vec<Note> {
            incomplete
                .iter()
                .filter(|n| pred(n))
                .map(|n| (*n).clone())
                .collect()
        };
        let todo_with = |priority: Priority| {
            move |n: &Note| n.analysis.note_type == NoteType::Todo && n.analysis.priority == priority
        };

        let mut urgent = select(&|n| n.analysis.note_type == NoteType::Important);
        urgent.extend(select(&todo_with(Priority::High)));

        let mut upcoming = select(&|n| n.analysis.note_type == NoteType::Reminder);
        upcoming.extend(select(&todo_with(Priority::Medium)));

        Self {
            urgent,
            upcoming,
            later: select(&todo_with(Priority::Low)),
            ideas: select(&|n| n.analysis.note_type == NoteType::Idea),
            general: select(&|n| n.analysis.note_type == NoteType::Note),
        }
    }

    /// Returns `(label, notes)` pairs in display order.
    #[must_use]
    pub fn sections(&self) -> [(&'static str, &[Note]); 5] {
        [
            ("Urgent", self.urgent.as_slice()),
            ("Upcoming", self.upcoming.as_slice()),
            ("Later", self.later.as_slice()),
            ("Ideas", self.ideas.as_slice()),
            ("General", self.general.as_slice()),
        ]
    }
}
