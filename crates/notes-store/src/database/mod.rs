//! SQLite persistence for notes.

mod operations;
pub mod schema;

pub use operations::{Database, InitReport, SchemaOutcome, DEFAULT_BUSY_TIMEOUT};
