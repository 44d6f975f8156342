//! Service wiring for CLI commands.

use crate::config::{ConfigStore, FileConfigStore, Settings};
use crate::services::{AiService, BackupService, NotesService};
use crate::storage::{NoteStore, SqliteNoteStore};
use crate::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Stores and services shared by every command.
pub struct AppContext {
    settings: Settings,
    config_store: Arc<dyn ConfigStore>,
    note_store: Arc<dyn NoteStore>,
    ai: Arc<AiService>,
}

impl AppContext {
    /// Opens the note database and the AI configuration named by `settings`.
    ///
    /// The AI configuration lives in the settings file itself (its `[ai]`
    /// table), falling back to the default path when `settings` was not
    /// loaded from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the note database cannot be opened.
    pub fn open(settings: Settings) -> Result<Self> {
        let config_path = settings
            .source
            .clone()
            .unwrap_or_else(crate::config::default_config_path);
        let note_store = Arc::new(SqliteNoteStore::open(settings.database_path())?);
        Ok(Self::with_stores(
            settings,
            Arc::new(FileConfigStore::new(config_path)),
            note_store,
        ))
    }

    /// Builds a context over explicit stores.
    #[must_use]
    pub fn with_stores(
        settings: Settings,
        config_store: Arc<dyn ConfigStore>,
        note_store: Arc<dyn NoteStore>,
    ) -> Self {
        let ai = Arc::new(AiService::with_http_config(
            Arc::clone(&config_store),
            settings.http,
        ));
        Self {
            settings,
            config_store,
            note_store,
            ai,
        }
    }

    /// Returns the loaded settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Path of the settings file holding the AI configuration.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.settings
            .source
            .clone()
            .unwrap_or_else(crate::config::default_config_path)
    }

    /// Returns the AI configuration store.
    #[must_use]
    pub const fn config_store(&self) -> &Arc<dyn ConfigStore> {
        &self.config_store
    }

    /// Returns the AI facade.
    #[must_use]
    pub const fn ai(&self) -> &Arc<AiService> {
        &self.ai
    }

    /// Builds the notes service.
    #[must_use]
    pub fn notes(&self) -> NotesService {
        NotesService::new(Arc::clone(&self.ai), Arc::clone(&self.note_store))
    }

    /// Builds the backup service.
    #[must_use]
    pub fn backup(&self) -> BackupService {
        BackupService::new(Arc::clone(&self.note_store), Arc::clone(&self.config_store))
    }
}
