//! Backup export and import.
//!
//! The file format matches the browser app's backups: notes plus a map of
//! string-encoded settings keyed `ollama-config` and `ai-config`. Files can
//! move between the two in either direction.

use crate::config::{AiConfig, ConfigStore, OllamaConfig};
use crate::models::Note;
use crate::storage::NoteStore;
use crate::{Error, Result, current_timestamp_millis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Backup format version written by [`BackupService::export_data`].
pub const BACKUP_VERSION: &str = "1.0";

/// Settings key holding the legacy Ollama-only configuration.
pub const OLLAMA_CONFIG_KEY: &str = "ollama-config";

/// Settings key holding the full provider configuration.
pub const AI_CONFIG_KEY: &str = "ai-config";

/// Serialized backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    /// Format version.
    pub version: String,
    /// Export time (Unix epoch milliseconds).
    #[serde(default)]
    pub timestamp: u64,
    /// Exported notes. Entries without an id are skipped on import.
    pub notes: Vec<serde_json::Value>,
    /// Settings keys cleared before import.
    #[serde(default)]
    pub local_storage_keys: Vec<String>,
    /// Settings values, each a JSON document encoded as a string.
    pub local_storage_data: BTreeMap<String, String>,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Notes written to the store.
    pub notes_imported: usize,
    /// Notes skipped for missing ids or unreadable fields.
    pub notes_skipped: usize,
    /// Whether the AI configuration was replaced.
    pub config_restored: bool,
}

/// Service for exporting and importing backups.
pub struct BackupService {
    notes: Arc<dyn NoteStore>,
    config: Arc<dyn ConfigStore>,
}

impl BackupService {
    /// Creates a new backup service.
    #[must_use]
    pub fn new(notes: Arc<dyn NoteStore>, config: Arc<dyn ConfigStore>) -> Self {
        Self { notes, config }
    }

    /// Serializes all notes and the AI configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if notes or configuration cannot be read.
    pub fn export_data(&self) -> Result<String> {
        let notes = self
            .notes
            .get_all()?
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(serialize_error)?;

        let config = self.config.load()?;
        let mut local_storage_data = BTreeMap::new();
        local_storage_data.insert(
            OLLAMA_CONFIG_KEY.to_string(),
            serde_json::to_string(&config.ollama).map_err(serialize_error)?,
        );
        local_storage_data.insert(
            AI_CONFIG_KEY.to_string(),
            serde_json::to_string(&config).map_err(serialize_error)?,
        );

        let data = ExportData {
            version: BACKUP_VERSION.to_string(),
            timestamp: current_timestamp_millis(),
            notes,
            local_storage_keys: vec![OLLAMA_CONFIG_KEY.to_string(), AI_CONFIG_KEY.to_string()],
            local_storage_data,
        };
        tracing::info!(notes = data.notes.len(), "Exported backup");
        serde_json::to_string_pretty(&data).map_err(serialize_error)
    }

    /// Writes [`Self::export_data`] to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the export or the file write fails.
    pub fn export_to_file(&self, path: &Path) -> Result<()> {
        let json = self.export_data()?;
        std::fs::write(path, json).map_err(|e| Error::OperationFailed {
            operation: "write_backup".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }

    /// Replaces all notes, and the AI configuration when present, with the
    /// contents of a backup.
    ///
    /// The backup is validated before anything is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the document is not a backup, or a
    /// storage error.
    pub fn import_data(&self, json: &str) -> Result<ImportSummary> {
        let data: ExportData = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("Invalid export file format: {e}")))?;
        if data.version.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Invalid export file format: missing version".to_string(),
            ));
        }
        tracing::info!(
            version = %data.version,
            exported_at = data.timestamp,
            notes = data.notes.len(),
            "Importing backup"
        );

        let restored_config = restored_config(&data, self.config.load()?)?;

        let mut notes = Vec::with_capacity(data.notes.len());
        let mut skipped = 0;
        for value in data.notes {
            let has_id = value
                .get("id")
                .and_then(serde_json::Value::as_str)
                .is_some_and(|id| !id.is_empty());
            match serde_json::from_value::<Note>(value) {
                Ok(note) if has_id => notes.push(note),
                Ok(_) => skipped += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable note in backup");
                    skipped += 1;
                },
            }
        }

        self.notes.clear()?;
        for note in &notes {
            self.notes.put(note)?;
        }

        let config_restored = restored_config.is_some();
        if let Some(config) = restored_config {
            self.config.save(&config)?;
        }

        Ok(ImportSummary {
            notes_imported: notes.len(),
            notes_skipped: skipped,
            config_restored,
        })
    }

    /// Reads `path` and passes it to [`Self::import_data`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the import fails.
    pub fn import_from_file(&self, path: &Path) -> Result<ImportSummary> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_backup".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        self.import_data(&json)
    }
}

/// Builds the configuration a backup restores, if it carries one.
///
/// `ai-config` wins over the legacy `ollama-config`; the legacy key only
/// replaces the Ollama section of `current`.
fn restored_config(data: &ExportData, mut current: AiConfig) -> Result<Option<AiConfig>> {
    if let Some(raw) = data.local_storage_data.get(AI_CONFIG_KEY) {
        let config = serde_json::from_str(raw)
            .map_err(|e| Error::InvalidInput(format!("Invalid {AI_CONFIG_KEY} in backup: {e}")))?;
        return Ok(Some(config));
    }
    if let Some(raw) = data.local_storage_data.get(OLLAMA_CONFIG_KEY) {
        let ollama: OllamaConfig = serde_json::from_str(raw).map_err(|e| {
            Error::InvalidInput(format!("Invalid {OLLAMA_CONFIG_KEY} in backup: {e}"))
        })?;
        current.ollama = ollama;
        return Ok(Some(current));
    }
    Ok(None)
}

#[allow(clippy::needless_pass_by_value)]
fn serialize_error(e: serde_json::Error) -> Error {
    Error::OperationFailed {
        operation: "serialize_backup".to_string(),
        cause: e.to_string(),
    }
}
