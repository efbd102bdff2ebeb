//! Error types for the notes store.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the notes store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database cannot be reached, written, or locked in time.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] rusqlite::Error),

    /// An existing object has a shape the store cannot use. Never repaired automatically.
    #[error("schema conflict on `{object}`: {reason}")]
    SchemaConflict { object: String, reason: String },

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("database error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn conflict(object: &str, reason: impl Into<String>) -> Self {
        StoreError::SchemaConflict {
            object: object.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable(_))
    }

    pub fn is_schema_conflict(&self) -> bool {
        matches!(self, StoreError::SchemaConflict { .. })
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if matches!(err, rusqlite::Error::InvalidPath(_)) {
            return StoreError::StorageUnavailable(err);
        }

        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => {
                let message = match &err {
                    rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.clone(),
                    other => other.to_string(),
                };
                StoreError::ConstraintViolation(message)
            }
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::ReadOnly
                | ErrorCode::PermissionDenied
                | ErrorCode::AuthorizationForStatementDenied
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::DiskFull,
            ) => StoreError::StorageUnavailable(err),
            _ => StoreError::Sqlite(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(code: std::os::raw::c_int, msg: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), Some(msg.to_string()))
    }

    #[test]
    fn test_classifies_constraint_violation() {
        let err = StoreError::from(failure(
            rusqlite::ffi::SQLITE_CONSTRAINT_NOTNULL,
            "NOT NULL constraint failed: notes.title",
        ));
        match err {
            StoreError::ConstraintViolation(msg) => assert!(msg.contains("notes.title")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classifies_storage_unavailable() {
        for code in [
            rusqlite::ffi::SQLITE_CANTOPEN,
            rusqlite::ffi::SQLITE_READONLY,
            rusqlite::ffi::SQLITE_BUSY,
            rusqlite::ffi::SQLITE_PERM,
        ] {
            assert!(StoreError::from(failure(code, "x")).is_storage_unavailable());
        }
    }

    #[test]
    fn test_other_errors_stay_generic() {
        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[test]
    fn test_conflict_message() {
        let err = StoreError::conflict("notes", "missing column `pinned`");
        assert!(err.is_schema_conflict());
        assert_eq!(
            err.to_string(),
            "schema conflict on `notes`: missing column `pinned`"
        );
    }
}
