//! Business logic services.
//!
//! Services orchestrate the AI facade and the note and configuration stores.

mod ai;
mod backup;
mod monitor;
mod notes;

pub use ai::AiService;
pub use backup::{
    AI_CONFIG_KEY, BACKUP_VERSION, BackupService, ExportData, ImportSummary, OLLAMA_CONFIG_KEY,
};
pub use monitor::{ConnectionMonitor, DEFAULT_MONITOR_INTERVAL};
pub use notes::NotesService;
