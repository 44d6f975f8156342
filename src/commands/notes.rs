//! Note commands.

use smart_notes::cli::{
    AppContext, render_analysis, render_chat_history, render_note_line, render_notes,
    render_prioritized,
};
use smart_notes::models::NoteFilter;

/// Options of the list command.
pub struct ListOptions {
    /// Group open notes by urgency.
    pub prioritized: bool,
    /// Include completed notes; overrides `filter`.
    pub all: bool,
    /// View to show.
    pub filter: NoteFilter,
    /// Text to search for; empty matches everything.
    pub search: String,
}

/// Add command.
pub fn cmd_add(app: &AppContext, content: &str) -> anyhow::Result<()> {
    let note = app.notes().add_note(content)?;
    println!("Note added: {}", note.id);
    print!("{}", render_analysis(&note.analysis));
    Ok(())
}

/// List command.
pub fn cmd_list(app: &AppContext, options: ListOptions) -> anyhow::Result<()> {
    let service = app.notes();
    if options.prioritized {
        print!("{}", render_prioritized(&service.prioritized()?));
        return Ok(());
    }

    let notes = if options.all {
        service.search(&options.search)?
    } else {
        service.list_filtered(options.filter, &options.search)?
    };
    print!("{}", render_notes(&notes));
    Ok(())
}

/// Edit command.
pub fn cmd_edit(app: &AppContext, id: &str, content: &str) -> anyhow::Result<()> {
    let note = app.notes().edit_note(id, content)?;
    println!("{}", render_note_line(&note));
    Ok(())
}

/// Done command.
pub fn cmd_done(app: &AppContext, id: &str) -> anyhow::Result<()> {
    let note = app.notes().toggle_complete(id)?;
    println!("{}", render_note_line(&note));
    Ok(())
}

/// Delete command.
pub fn cmd_delete(app: &AppContext, id: &str) -> anyhow::Result<()> {
    let note = app.notes().delete_note(id)?;
    println!("Deleted {}", note.id);
    Ok(())
}

/// Ask command.
pub fn cmd_ask(app: &AppContext, id: &str, question: &str) -> anyhow::Result<()> {
    let message = app.notes().ask_about_note(id, question)?;
    println!("{}", message.response);
    Ok(())
}

/// History command: lists a note's questions, or deletes one entry.
pub fn cmd_history(app: &AppContext, id: &str, delete: Option<&str>) -> anyhow::Result<()> {
    let service = app.notes();
    if let Some(message_id) = delete {
        service.delete_chat_message(id, message_id)?;
        println!("Deleted {message_id}");
        return Ok(());
    }
    print!("{}", render_chat_history(&service.chat_history(id)?));
    Ok(())
}
