//! Support code for the `smart-notes` command-line interface.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `add` | Analyze and store a note |
//! | `list` | List notes, optionally grouped by urgency |
//! | `done` | Toggle a note's completed flag |
//! | `delete` | Delete a note |
//! | `ask` | Ask the AI a question about a note |
//! | `status` | Check the active AI provider |
//! | `models` | List the active provider's models |
//! | `config` | Show or change the AI provider configuration |
//! | `export` / `import` | Backup files |
//!
//! The binary's handlers stay thin; wiring, rendering and configuration
//! edits live here so they can be tested.

mod config;
mod context;
mod render;

pub use config::{ConfigUpdate, apply_config_update};
pub use context::AppContext;
pub use render::{
    render_ai_config, render_analysis, render_chat_history, render_note_line, render_notes,
    render_prioritized,
};
