//! `SQLite`-based note store.
//!
//! # Schema
//!
//! A `notes` table: `id`, `content`, `analysis` (JSON text), `timestamp`
//! (epoch milliseconds) and `completed` (0/1). The analysis is kept as JSON
//! so new fields do not need a migration.
//!
//! A `chat_history` table holds the questions asked about each note:
//! `id`, `note_id`, `question`, `response` and `timestamp`. Rows go away
//! with their note.

mod connection;

pub use connection::acquire_lock;
use connection::{configure_connection, record_operation_metrics};

use crate::models::{AnalysisResult, ChatMessage, Note, NoteId};
use crate::storage::NoteStore;
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::instrument;

const SELECT_COLUMNS: &str = "SELECT id, content, analysis, timestamp, completed FROM notes";

const SELECT_CHAT_COLUMNS: &str =
    "SELECT id, note_id, question, response, timestamp FROM chat_history";

/// `SQLite`-backed [`NoteStore`].
///
/// Protected by a `Mutex` because `rusqlite::Connection` is not `Sync`.
pub struct SqliteNoteStore {
    conn: Mutex<Connection>,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
}

/// Raw column values of one `notes` row.
struct NoteRow {
    id: String,
    content: String,
    analysis: String,
    timestamp: i64,
    completed: bool,
}

impl NoteRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            analysis: row.get(2)?,
            timestamp: row.get(3)?,
            completed: row.get(4)?,
        })
    }

    fn into_note(self) -> Result<Note> {
        let analysis: AnalysisResult =
            serde_json::from_str(&self.analysis).map_err(|e| Error::OperationFailed {
                operation: "decode_note_analysis".to_string(),
                cause: format!("{}: {e}", self.id),
            })?;
        Ok(Note {
            id: NoteId::new(self.id),
            content: self.content,
            analysis,
            timestamp: u64::try_from(self.timestamp).unwrap_or(0),
            completed: self.completed,
        })
    }
}

fn chat_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    let note_id: String = row.get(1)?;
    let timestamp: i64 = row.get(4)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        note_id: NoteId::new(note_id),
        question: row.get(2)?,
        response: row.get(3)?,
        timestamp: u64::try_from(timestamp).unwrap_or(0),
    })
}

fn db_error(operation: &str, e: &rusqlite::Error) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    }
}

fn finish<T>(operation: &'static str, start: Instant, result: Result<T>) -> Result<T> {
    let status = if result.is_ok() { "success" } else { "error" };
    record_operation_metrics(operation, start, status);
    result
}

impl SqliteNoteStore {
    /// Opens (creating if needed) the database at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_data_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }
        let conn = Connection::open(&db_path).map_err(|e| db_error("open_sqlite", &e))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| db_error("open_sqlite_in_memory", &e))?;
        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn initialize(&self) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        configure_connection(&conn)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                analysis TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )
        .map_err(|e| db_error("create_notes_table", &e))?;

        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_notes_timestamp ON notes(timestamp DESC)",
            [],
        );

        conn.execute(
            "CREATE TABLE IF NOT EXISTS chat_history (
                id TEXT PRIMARY KEY,
                note_id TEXT NOT NULL,
                question TEXT NOT NULL,
                response TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| db_error("create_chat_history_table", &e))?;

        let _ = conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_chat_history_note ON chat_history(note_id, timestamp)",
            [],
        );
        Ok(())
    }

    fn encode(note: &Note) -> Result<(String, i64)> {
        let analysis = serde_json::to_string(&note.analysis).map_err(|e| Error::OperationFailed {
            operation: "encode_note_analysis".to_string(),
            cause: e.to_string(),
        })?;
        let timestamp = i64::try_from(note.timestamp).map_err(|_| {
            Error::InvalidInput(format!("timestamp out of range: {}", note.timestamp))
        })?;
        Ok((analysis, timestamp))
    }
}

impl NoteStore for SqliteNoteStore {
    #[instrument(skip(self, note), fields(operation = "put", note.id = %note.id))]
    fn put(&self, note: &Note) -> Result<()> {
        let start = Instant::now();
        let result: Result<()> = (|| {
            let (analysis, timestamp) = Self::encode(note)?;
            let conn = acquire_lock(&self.conn);
            conn.execute(
                "INSERT OR REPLACE INTO notes (id, content, analysis, timestamp, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![note.id.as_str(), note.content, analysis, timestamp, note.completed],
            )
            .map_err(|e| db_error("insert_note", &e))?;
            Ok(())
        })();
        finish("put", start, result)
    }

    #[instrument(skip(self), fields(operation = "get", note.id = %id))]
    fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        let start = Instant::now();
        let result: Result<Option<Note>> = (|| {
            let conn = acquire_lock(&self.conn);
            let row = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                    params![id.as_str()],
                    NoteRow::from_row,
                )
                .optional()
                .map_err(|e| db_error("get_note", &e))?;
            row.map(NoteRow::into_note).transpose()
        })();
        finish("get", start, result)
    }

    #[instrument(skip(self), fields(operation = "get_all"))]
    fn get_all(&self) -> Result<Vec<Note>> {
        let start = Instant::now();
        let result: Result<Vec<Note>> = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare(&format!("{SELECT_COLUMNS} ORDER BY timestamp DESC, id DESC"))
                .map_err(|e| db_error("prepare_list_notes", &e))?;
            let rows = stmt
                .query_map([], NoteRow::from_row)
                .map_err(|e| db_error("list_notes", &e))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| db_error("list_notes", &e))?;
            rows.into_iter().map(NoteRow::into_note).collect()
        })();
        finish("get_all", start, result)
    }

    #[instrument(skip(self, note), fields(operation = "update", note.id = %note.id))]
    fn update(&self, note: &Note) -> Result<()> {
        let start = Instant::now();
        let result: Result<()> = (|| {
            let (analysis, timestamp) = Self::encode(note)?;
            let conn = acquire_lock(&self.conn);
            let changed = conn
                .execute(
                    "UPDATE notes SET content = ?2, analysis = ?3, timestamp = ?4, completed = ?5
                     WHERE id = ?1",
                    params![note.id.as_str(), note.content, analysis, timestamp, note.completed],
                )
                .map_err(|e| db_error("update_note", &e))?;
            if changed == 0 {
                return Err(Error::NotFound(note.id.to_string()));
            }
            Ok(())
        })();
        finish("update", start, result)
    }

    #[instrument(skip(self), fields(operation = "delete", note.id = %id))]
    fn delete(&self, id: &NoteId) -> Result<bool> {
        let start = Instant::now();
        let result: Result<bool> = (|| {
            let conn = acquire_lock(&self.conn);
            let changed = conn
                .execute("DELETE FROM notes WHERE id = ?1", params![id.as_str()])
                .map_err(|e| db_error("delete_note", &e))?;
            conn.execute(
                "DELETE FROM chat_history WHERE note_id = ?1",
                params![id.as_str()],
            )
            .map_err(|e| db_error("delete_note_history", &e))?;
            Ok(changed > 0)
        })();
        finish("delete", start, result)
    }

    #[instrument(skip(self), fields(operation = "clear"))]
    fn clear(&self) -> Result<()> {
        let start = Instant::now();
        let result: Result<()> = (|| {
            let conn = acquire_lock(&self.conn);
            conn.execute("DELETE FROM notes", [])
                .map_err(|e| db_error("clear_notes", &e))?;
            conn.execute("DELETE FROM chat_history", [])
                .map_err(|e| db_error("clear_chat_history", &e))?;
            Ok(())
        })();
        finish("clear", start, result)
    }

    fn count(&self) -> Result<usize> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .map_err(|e| db_error("count_notes", &e))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    #[instrument(
        skip(self, message),
        fields(operation = "append_chat", note.id = %message.note_id, message.id = %message.id)
    )]
    fn append_chat(&self, message: &ChatMessage) -> Result<()> {
        let start = Instant::now();
        let result: Result<()> = (|| {
            let timestamp = i64::try_from(message.timestamp).map_err(|_| {
                Error::InvalidInput(format!("timestamp out of range: {}", message.timestamp))
            })?;
            let conn = acquire_lock(&self.conn);
            conn.execute(
                "INSERT OR REPLACE INTO chat_history (id, note_id, question, response, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.id,
                    message.note_id.as_str(),
                    message.question,
                    message.response,
                    timestamp
                ],
            )
            .map_err(|e| db_error("insert_chat_message", &e))?;
            Ok(())
        })();
        finish("append_chat", start, result)
    }

    #[instrument(skip(self), fields(operation = "chat_history", note.id = %note_id))]
    fn chat_history(&self, note_id: &NoteId) -> Result<Vec<ChatMessage>> {
        let start = Instant::now();
        let result: Result<Vec<ChatMessage>> = (|| {
            let conn = acquire_lock(&self.conn);
            let mut stmt = conn
                .prepare(&format!(
                    "{SELECT_CHAT_COLUMNS} WHERE note_id = ?1 ORDER BY timestamp ASC, rowid ASC"
                ))
                .map_err(|e| db_error("prepare_chat_history", &e))?;
            let messages = stmt
                .query_map(params![note_id.as_str()], chat_from_row)
                .map_err(|e| db_error("chat_history", &e))?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| db_error("chat_history", &e))?;
            Ok(messages)
        })();
        finish("chat_history", start, result)
    }

    #[instrument(skip(self), fields(operation = "delete_chat_message", note.id = %note_id))]
    fn delete_chat_message(&self, note_id: &NoteId, message_id: &str) -> Result<bool> {
        let start = Instant::now();
        let result: Result<bool> = (|| {
            let conn = acquire_lock(&self.conn);
            let changed = conn
                .execute(
                    "DELETE FROM chat_history WHERE note_id = ?1 AND id = ?2",
                    params![note_id.as_str(), message_id],
                )
                .map_err(|e| db_error("delete_chat_message", &e))?;
            Ok(changed > 0)
        })();
        finish("delete_chat_message", start, result)
    }
}
