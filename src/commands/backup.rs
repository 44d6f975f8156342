//! Backup commands.

use smart_notes::cli::AppContext;
use std::path::Path;

/// Export command.
pub fn cmd_export(app: &AppContext, path: &Path) -> anyhow::Result<()> {
    app.backup().export_to_file(path)?;
    println!("Exported to {}", path.display());
    Ok(())
}

/// Import command.
pub fn cmd_import(app: &AppContext, path: &Path) -> anyhow::Result<()> {
    let summary = app.backup().import_from_file(path)?;
    println!(
        "Imported {} notes ({} skipped){}",
        summary.notes_imported,
        summary.notes_skipped,
        if summary.config_restored {
            ", AI configuration restored"
        } else {
            ""
        }
    );
    Ok(())
}
