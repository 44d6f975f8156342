//! Note lifecycle service.
//!
//! Creating a note always succeeds once it reaches storage: the AI
//! classification degrades to a default when the backend is unavailable.

use super::AiService;
use crate::models::{ChatMessage, Note, NoteFilter, NoteId, PrioritizedNotes};
use crate::storage::NoteStore;
use crate::{Error, Result, current_timestamp_millis};
use std::sync::Arc;
use tracing::instrument;

/// Service for creating, completing, deleting and querying notes.
pub struct NotesService {
    ai: Arc<AiService>,
    store: Arc<dyn NoteStore>,
}

impl NotesService {
    /// Creates a new notes service.
    #[must_use]
    pub fn new(ai: Arc<AiService>, store: Arc<dyn NoteStore>) -> Self {
        Self { ai, store }
    }

    /// Returns the AI facade.
    #[must_use]
    pub const fn ai(&self) -> &Arc<AiService> {
        &self.ai
    }

    /// Analyzes and stores a new note.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank content, or a storage error.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn add_note(&self, content: &str) -> Result<Note> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput("Note content cannot be empty".to_string()));
        }

        let analysis = self.ai.analyze_note(content);
        let note = Note::new(content, analysis, current_timestamp_millis());
        self.store.put(&note)?;

        metrics::counter!(
            "notes_created_total",
            "type" => note.analysis.note_type.as_str()
        )
        .increment(1);
        tracing::info!(
            note.id = %note.id,
            note_type = %note.analysis.note_type,
            priority = %note.analysis.priority,
            "Note created"
        );
        Ok(note)
    }

    /// Returns all notes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn list_notes(&self) -> Result<Vec<Note>> {
        self.store.get_all()
    }

    /// Returns the notes in `filter`'s view that match `query`, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn list_filtered(&self, filter: NoteFilter, query: &str) -> Result<Vec<Note>> {
        Ok(self
            .store
            .get_all()?
            .into_iter()
            .filter(|n| filter.matches(n) && n.matches_query(query))
            .collect())
    }

    /// Searches every note, completed ones included, by content, summary
    /// and action items.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str) -> Result<Vec<Note>> {
        let found: Vec<Note> = self
            .store
            .get_all()?
            .into_iter()
            .filter(|n| n.matches_query(query))
            .collect();
        tracing::debug!(results = found.len(), "Notes searched");
        Ok(found)
    }

    /// Groups incomplete notes by urgency.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn prioritized(&self) -> Result<PrioritizedNotes> {
        Ok(PrioritizedNotes::from_notes(&self.store.get_all()?))
    }

    /// Resolves a full note ID or a unique prefix of one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if nothing matches and
    /// [`Error::InvalidInput`] if the prefix is ambiguous.
    pub fn find_note(&self, id_or_prefix: &str) -> Result<Note> {
        let id_or_prefix = id_or_prefix.trim();
        if let Some(note) = self.store.get(&NoteId::new(id_or_prefix))? {
            return Ok(note);
        }
        if id_or_prefix.is_empty() {
            return Err(Error::NotFound(String::new()));
        }

        let mut matches: Vec<Note> = self
            .store
            .get_all()?
            .into_iter()
            .filter(|n| n.id.as_str().starts_with(id_or_prefix))
            .collect();
        match matches.len() {
            0 => Err(Error::NotFound(id_or_prefix.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(Error::InvalidInput(format!(
                "'{id_or_prefix}' matches {n} notes; use a longer prefix"
            ))),
        }
    }

    /// Flips a note's completed flag and returns the updated note.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown ID, or a storage error.
    #[instrument(skip(self))]
    pub fn toggle_complete(&self, id: &str) -> Result<Note> {
        let mut note = self.find_note(id)?;
        note.completed = !note.completed;
        self.store.update(&note)?;
        tracing::debug!(note.id = %note.id, completed = note.completed, "Note toggled");
        Ok(note)
    }

    /// Replaces a note's content and returns the note.
    ///
    /// The stored classification is kept. Content equal to the current
    /// text after trimming leaves the note untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank content,
    /// [`Error::NotFound`] for an unknown ID, or a storage error.
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub fn edit_note(&self, id: &str, content: &str) -> Result<Note> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput("Note content cannot be empty".to_string()));
        }
        let mut note = self.find_note(id)?;
        if note.content == content {
            return Ok(note);
        }
        content.clone_into(&mut note.content);
        self.store.update(&note)?;
        tracing::debug!(note.id = %note.id, "Note edited");
        Ok(note)
    }

    /// Deletes a note and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown ID, or a storage error.
    #[instrument(skip(self))]
    pub fn delete_note(&self, id: &str) -> Result<Note> {
        let note = self.find_note(id)?;
        if !self.store.delete(&note.id)? {
            return Err(Error::NotFound(note.id.to_string()));
        }
        tracing::debug!(note.id = %note.id, "Note deleted");
        Ok(note)
    }

    /// Asks the AI a question about a stored note and records the exchange
    /// in the note's history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank question or
    /// [`Error::NotFound`] for an unknown ID. AI failures are not errors;
    /// they produce an apology answer, which is recorded too.
    #[instrument(skip(self, question))]
    pub fn ask_about_note(&self, id: &str, question: &str) -> Result<ChatMessage> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("Question cannot be empty".to_string()));
        }
        let note = self.find_note(id)?;
        let answer = self.ai.ask_question(&note.content, question);
        let message = ChatMessage::new(note.id, question, answer, current_timestamp_millis());
        self.store.append_chat(&message)?;
        Ok(message)
    }

    /// Returns the questions asked about a note, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown ID, or a storage error.
    pub fn chat_history(&self, id: &str) -> Result<Vec<ChatMessage>> {
        let note = self.find_note(id)?;
        self.store.chat_history(&note.id)
    }

    /// Removes one entry from a note's history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the note or the entry does not exist.
    #[instrument(skip(self))]
    pub fn delete_chat_message(&self, id: &str, message_id: &str) -> Result<()> {
        let note = self.find_note(id)?;
        let message_id = message_id.trim();
        if !self.store.delete_chat_message(&note.id, message_id)? {
            return Err(Error::NotFound(message_id.to_string()));
        }
        tracing::debug!(note.id = %note.id, message.id = message_id, "Chat message deleted");
        Ok(())
    }
}
