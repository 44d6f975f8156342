//! Data models for smart-notes.

mod analysis;
mod chat;
mod events;
mod note;

pub use analysis::{
    AnalysisResult, NoteType, Priority, SUMMARY_FALLBACK_CHARS, default_summary,
};
pub use chat::ChatMessage;
pub use events::{AiEvent, AiOperation, EventMeta};
pub use note::{Note, NoteFilter, NoteId, PrioritizedNotes};
