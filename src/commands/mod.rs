//! Command handlers.
//!
//! - `notes.rs`: add, list, edit, done, delete, ask, history
//! - `ai.rs`: status, models
//! - `config.rs`: configuration display and edits
//! - `backup.rs`: export and import

mod ai;
mod backup;
mod config;
mod notes;

pub use ai::{cmd_models, cmd_status};
pub use backup::{cmd_export, cmd_import};
pub use config::cmd_config;
pub use notes::{
    ListOptions, cmd_add, cmd_ask, cmd_delete, cmd_done, cmd_edit, cmd_history, cmd_list,
};
