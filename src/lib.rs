//! # Smart Notes
//!
//! Note taking with automatic AI classification.
//!
//! Notes are sent to a configurable model backend (a local Ollama server, the
//! Gemini API, or any OpenAI-compatible chat completions endpoint) which
//! classifies them by type and priority, writes a short summary and pulls out
//! action items. Results are stored locally alongside the note.
//!
//! The AI layer favours availability: a failing backend never blocks note
//! creation. Every provider call degrades to a safe default value and reports
//! the failure as a structured [`models::AiEvent`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use smart_notes::config::MemoryConfigStore;
//! use smart_notes::services::{AiService, NotesService};
//! use smart_notes::storage::SqliteNoteStore;
//!
//! let ai = Arc::new(AiService::new(Arc::new(MemoryConfigStore::default())));
//! let notes = NotesService::new(ai, Arc::new(SqliteNoteStore::in_memory()?));
//! let note = notes.add_note("Buy milk before Friday")?;
//! println!("{} ({})", note.analysis.summary, note.analysis.priority);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::{AiConfig, ConfigStore, ProviderConfig, ProviderKind, Settings};
pub use llm::AiProvider;
pub use models::{AnalysisResult, Note, NoteId, NoteType, Priority};
pub use services::{AiService, BackupService, NotesService};
pub use storage::{NoteStore, SqliteNoteStore};

/// Error type for smart-notes operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Network` | A backend request could not be sent, or timed out |
/// | `Protocol` | A backend answered with a non-success HTTP status |
/// | `Parse` | No JSON could be recovered from a model response |
/// | `InvalidInput` | Empty note content, malformed import files |
/// | `NotFound` | A note id does not exist in the store |
/// | `OperationFailed` | `SQLite`, filesystem or config file failures |
///
/// The first three never escape the AI facade: provider clients turn them
/// into default values.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The request could not be sent or timed out.
    #[error("{provider} request failed: {cause}")]
    Network {
        /// Provider that was called.
        provider: &'static str,
        /// The underlying cause.
        cause: String,
    },

    /// The backend returned a non-success status.
    #[error("{provider} returned status {status}: {body}")]
    Protocol {
        /// Provider that was called.
        provider: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The JSON extractor exhausted every strategy.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A requested note does not exist.
    #[error("note not found: {0}")]
    NotFound(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Short machine-readable category, used in logs and events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Protocol { .. } => "protocol",
            Self::Parse(_) => "parse",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::OperationFailed { .. } => "operation_failed",
        }
    }
}

/// Result type alias for smart-notes operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in milliseconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
