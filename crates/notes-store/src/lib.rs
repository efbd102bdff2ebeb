//! Durable SQLite store for notes.
//!
//! [`Database::ensure_schema`] idempotently creates the `notes` table and
//! refuses to touch an incompatible one. The rest of [`Database`] is a small
//! data-access layer over that table.

pub mod config;
pub mod connection_info;
pub mod database;
pub mod error;

pub use config::{AppInfo, Config, ConfigError, DatabaseConfig};
pub use database::{Database, InitReport, SchemaOutcome};
pub use error::{Result, StoreError};
pub use notes_common::{NewNote, Note, NoteFilter, NoteUpdate};
