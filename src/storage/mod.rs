//! Note storage.
//!
//! [`NoteStore`] is the contract the notes service consumes. The only
//! shipped backend is [`SqliteNoteStore`], which also runs in memory for
//! tests.

mod sqlite;

pub use sqlite::{SqliteNoteStore, acquire_lock};

use crate::Result;
use crate::models::{ChatMessage, Note, NoteId};

/// Trait for note persistence backends.
pub trait NoteStore: Send + Sync {
    /// Inserts a note, replacing any note with the same ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put(&self, note: &Note) -> Result<()>;

    /// Retrieves a note by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, id: &NoteId) -> Result<Option<Note>>;

    /// Returns all notes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get_all(&self) -> Result<Vec<Note>>;

    /// Overwrites an existing note.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if no note has this ID.
    fn update(&self, note: &Note) -> Result<()>;

    /// Deletes a note and its question history. Returns `false` if the
    /// note did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete(&self, id: &NoteId) -> Result<bool>;

    /// Deletes every note and all question history.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn clear(&self) -> Result<()>;

    /// Returns the number of stored notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn count(&self) -> Result<usize> {
        Ok(self.get_all()?.len())
    }

    /// Appends a question/answer pair to its note's history.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn append_chat(&self, message: &ChatMessage) -> Result<()>;

    /// Returns the history of one note, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn chat_history(&self, note_id: &NoteId) -> Result<Vec<ChatMessage>>;

    /// Deletes one history entry of a note. Returns `false` if it did not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_chat_message(&self, note_id: &NoteId, message_id: &str) -> Result<bool>;
}
