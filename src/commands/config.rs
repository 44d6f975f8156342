//! Configuration command.

use smart_notes::cli::{AppContext, ConfigUpdate, apply_config_update, render_ai_config};

/// Config command.
///
/// Without changes (or with `--show`) prints the configuration; otherwise
/// applies the changes and saves them to the settings file.
pub fn cmd_config(app: &AppContext, show: bool, update: ConfigUpdate) -> anyhow::Result<()> {
    let store = app.config_store();
    let current = store.load()?;

    if update.is_empty() {
        println!("Settings file: {}", app.config_path().display());
        println!("Data dir:      {}", app.settings().data_dir.display());
        print!("{}", render_ai_config(&current));
        return Ok(());
    }

    let updated = apply_config_update(current, update)?;
    store.save(&updated)?;
    println!("Saved to {}", app.config_path().display());
    if show {
        print!("{}", render_ai_config(&updated));
    }
    Ok(())
}
