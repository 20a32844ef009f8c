//! Application error types for core storage and domain logic.
use thiserror::Error;

/// Broad category of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// The database file could not be opened.
    Open,
    /// The file exists but the process may not write to it.
    Permission,
    /// The engine gave up waiting for a lock.
    Busy,
    /// Prepare, bind, step or decode failure.
    Query,
}

/// Failure reported by the SQLite adapter.
///
/// The message is the engine diagnostic, truncated to
/// [`crate::constants::DB_ERROR_MAX`] bytes. It is meant for logs only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
}

impl StorageError {
    pub(crate) fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: bounded(message.into()),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        let kind = match value.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                StorageErrorKind::Busy
            }
            Some(rusqlite::ErrorCode::CannotOpen) => StorageErrorKind::Open,
            Some(rusqlite::ErrorCode::PermissionDenied) | Some(rusqlite::ErrorCode::ReadOnly) => {
                StorageErrorKind::Permission
            }
            _ => StorageErrorKind::Query,
        };
        Self::new(kind, value.to_string())
    }
}

fn bounded(mut message: String) -> String {
    let max = crate::constants::DB_ERROR_MAX;
    if message.len() > max {
        let mut cut = max;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    message
}

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    /// Shorthand for a [`AppError::Validation`] with a formatted message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_messages_are_bounded_on_char_boundaries() {
        let long = "é".repeat(200);
        let err = StorageError::new(StorageErrorKind::Query, long);
        assert!(err.message.len() <= crate::constants::DB_ERROR_MAX);
        assert!(err.message.chars().all(|ch| ch == 'é'));
    }

    #[test]
    fn busy_codes_map_to_busy_kind() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        );
        assert_eq!(StorageError::from(err).kind, StorageErrorKind::Busy);
    }
}
