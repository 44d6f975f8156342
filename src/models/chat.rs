//! Per-note question history.

use super::NoteId;
use serde::{Deserialize, Serialize};

/// One question asked about a note and the answer it got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique identifier, `msg-<millis>-<9 chars>`.
    pub id: String,
    /// The note the question was about.
    pub note_id: NoteId,
    /// The question as asked.
    pub question: String,
    /// The answer, or the apology when the provider failed.
    pub response: String,
    /// When the question was asked (Unix epoch milliseconds).
    pub timestamp: u64,
}

impl ChatMessage {
    /// Creates a message with a freshly generated ID.
    #[must_use]
    pub fn new(
        note_id: NoteId,
        question: impl Into<String>,
        response: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        let random = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("msg-{timestamp}-{}", &random[..9]),
            note_id,
            question: question.into(),
            response: response.into(),
            timestamp,
        }
    }
}
