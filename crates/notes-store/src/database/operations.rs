//! Database operations for the notes store.

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use notes_common::{NewNote, Note, NoteFilter, NoteUpdate, DEFAULT_LIST_LIMIT};

use super::schema::{self, ColumnDef, NOTES_TABLE};
use crate::config::AppInfo;
use crate::error::{Result, StoreError};

/// How long a connection waits on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const NOTE_COLUMNS: &str = "id, title, content, pinned, created_at, updated_at";

/// What `ensure_schema` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaOutcome {
    /// The notes table was created by this call.
    Created,
    /// A compatible notes table was already present.
    Ready,
}

impl SchemaOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaOutcome::Created => "created",
            SchemaOutcome::Ready => "ready",
        }
    }
}

/// Summary of a full initialization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitReport {
    pub notes_table: SchemaOutcome,
    /// User tables in the database, excluding SQLite internals.
    pub table_count: u64,
    pub app_info_records: u64,
}

/// Database handle shared across threads.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// Open (creating if needed) the database at a specific path.
    pub fn open_at(path: impl Into<PathBuf>, busy_timeout: Duration) -> Result<Self> {
        let path = path.into();
        let conn = Connection::open(&path).map_err(StoreError::StorageUnavailable)?;
        Self::configure(conn, path, busy_timeout)
    }

    /// Open an existing database without write access.
    pub fn open_read_only(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(StoreError::StorageUnavailable)?;
        Self::configure(conn, path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::StorageUnavailable)?;
        Self::configure(conn, PathBuf::from(":memory:"), DEFAULT_BUSY_TIMEOUT)
    }

    fn configure(conn: Connection, path: PathBuf, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        debug!("Opened database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make sure the notes table exists with the expected shape.
    ///
    /// Creates it when absent. An existing compatible table is left alone;
    /// an incompatible object named `notes` is reported as a conflict and
    /// never modified.
    pub fn ensure_schema(&self) -> Result<SchemaOutcome> {
        let mut conn = self.lock();
        // IMMEDIATE takes the write lock up front so concurrent callers queue
        // on the busy timeout instead of racing between check and create.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = if check_notes_table(&tx)? {
            SchemaOutcome::Ready
        } else {
            tx.execute_batch(schema::CREATE_NOTES_TABLE)?;
            SchemaOutcome::Created
        };
        tx.commit()?;

        match outcome {
            SchemaOutcome::Created => info!("Created notes table"),
            SchemaOutcome::Ready => debug!("Notes table already present"),
        }
        Ok(outcome)
    }

    /// Check the notes table without changing anything.
    ///
    /// Returns `false` if there is no table yet.
    pub fn verify_schema(&self) -> Result<bool> {
        let conn = self.lock();
        check_notes_table(&conn)
    }

    /// Create the `app_info` and `users` tables if missing.
    pub fn ensure_base_tables(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(schema::CREATE_APP_INFO_TABLE)?;
        conn.execute_batch(schema::CREATE_USERS_TABLE)?;
        Ok(())
    }

    /// Upsert the project metadata rows in `app_info`.
    pub fn seed_app_info(&self, app_info: &AppInfo) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT OR REPLACE INTO app_info (key, value) VALUES (?1, ?2)")?;
            for (key, value) in app_info.entries() {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Base tables, seed rows, then the notes schema.
    pub fn initialize(&self, app_info: &AppInfo) -> Result<InitReport> {
        self.ensure_base_tables()?;
        self.seed_app_info(app_info)?;
        let notes_table = self.ensure_schema()?;

        Ok(InitReport {
            notes_table,
            table_count: self.table_count()?,
            app_info_records: self.app_info_count()?,
        })
    }

    /// Insert a note, letting the engine fill omitted columns.
    pub fn insert_note(&self, note: &NewNote) -> Result<Note> {
        let mut columns = vec!["title"];
        let mut values: Vec<&dyn ToSql> = Vec::new();
        values.push(&note.title);
        if let Some(content) = &note.content {
            columns.push("content");
            values.push(content);
        }
        if let Some(pinned) = &note.pinned {
            columns.push("pinned");
            values.push(pinned);
        }

        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO notes ({}) VALUES ({}) RETURNING {}",
            columns.join(", "),
            placeholders,
            NOTE_COLUMNS
        );

        let conn = self.lock();
        let stored = conn.query_row(&sql, values.as_slice(), row_to_note)?;
        debug!("Inserted note {}", stored.id);
        Ok(stored)
    }

    /// Get a note by ID.
    pub fn get_note(&self, id: i64) -> Result<Option<Note>> {
        let conn = self.lock();
        let note = conn
            .query_row(
                &format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS),
                params![id],
                row_to_note,
            )
            .optional()?;
        Ok(note)
    }

    /// List notes, pinned first and then most recently updated.
    pub fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let conn = self.lock();
        let limit = filter.limit.unwrap_or(DEFAULT_LIST_LIMIT) as i64;
        let offset = filter.offset.unwrap_or(0) as i64;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notes
             WHERE (?1 = 0 OR pinned = 1)
             ORDER BY pinned DESC, updated_at DESC, id DESC
             LIMIT ?2 OFFSET ?3",
            NOTE_COLUMNS
        ))?;

        let notes = stmt
            .query_map(params![filter.pinned_only, limit, offset], row_to_note)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(notes)
    }

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// Returns `None` if no note has this ID. An empty update changes nothing.
    pub fn update_note(&self, id: i64, update: &NoteUpdate) -> Result<Option<Note>> {
        if update.is_empty() {
            return self.get_note(id);
        }

        let mut assignments = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();
        if let Some(title) = &update.title {
            values.push(title);
            assignments.push(format!("title = ?{}", values.len()));
        }
        if let Some(content) = &update.content {
            values.push(content);
            assignments.push(format!("content = ?{}", values.len()));
        }
        if let Some(pinned) = &update.pinned {
            values.push(pinned);
            assignments.push(format!("pinned = ?{}", values.len()));
        }
        assignments.push("updated_at = CURRENT_TIMESTAMP".to_string());
        values.push(&id);

        let sql = format!(
            "UPDATE notes SET {} WHERE id = ?{} RETURNING {}",
            assignments.join(", "),
            values.len(),
            NOTE_COLUMNS
        );

        let conn = self.lock();
        let note = conn
            .query_row(&sql, values.as_slice(), row_to_note)
            .optional()?;
        Ok(note)
    }

    /// Set pinned status.
    pub fn set_pinned(&self, id: i64, pinned: bool) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute(
            "UPDATE notes SET pinned = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![pinned, id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a note.
    pub fn delete_note(&self, id: i64) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Count stored notes.
    pub fn count_notes(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM notes")
    }

    /// Count user tables, ignoring `sqlite_` internals.
    pub fn table_count(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")
    }

    /// Count `app_info` rows.
    pub fn app_info_count(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM app_info")
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let conn = self.lock();
        let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Get database size in bytes.
    pub fn database_size(&self) -> Result<u64> {
        let metadata = std::fs::metadata(&self.path)?;
        Ok(metadata.len())
    }
}

/// Returns whether a compatible notes table exists, or a conflict if
/// something else holds the name.
fn check_notes_table(conn: &Connection) -> Result<bool> {
    let existing: Option<(String, Option<String>)> = conn
        .query_row(
            "SELECT type, sql FROM sqlite_master
             WHERE name = ?1 COLLATE NOCASE AND type != 'trigger'",
            params![NOTES_TABLE],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((kind, sql)) = existing else {
        return Ok(false);
    };
    if kind != "table" {
        return Err(StoreError::conflict(
            NOTES_TABLE,
            format!("existing object is {}, not a table", with_article(&kind)),
        ));
    }

    let actual = table_columns(conn, NOTES_TABLE)?;
    if let Some(reason) = schema::diff_columns(&schema::notes_columns(), &actual) {
        return Err(StoreError::conflict(NOTES_TABLE, reason));
    }

    // table_info cannot tell a reusable rowid key from AUTOINCREMENT.
    let autoincrement = sql
        .as_deref()
        .is_some_and(|sql| schema::column_is_autoincrement(sql, "id"));
    if !autoincrement {
        return Err(StoreError::conflict(
            NOTES_TABLE,
            "column `id` is not AUTOINCREMENT",
        ));
    }

    Ok(true)
}

fn with_article(kind: &str) -> String {
    match kind.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => format!("an {}", kind),
        _ => format!("a {}", kind),
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<ColumnDef>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1)",
    )?;
    let columns = stmt
        .query_map(params![table], |row| {
            Ok(ColumnDef {
                name: row.get(0)?,
                decl_type: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
                default: row.get(3)?,
                primary_key: row.get::<_, i64>(4)? != 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

fn row_to_note(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        pinned: row.get::<_, i64>(3)? != 0,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
