//! SQLite adapter and entity repositories for tmpup.
//!
//! A [`Connection`] is a scoped handle owned by exactly one actor (a request
//! worker or the maintenance thread). It is opened per operation cycle and
//! dropped afterwards; it is never shared between threads.
//!
//! Statements are bound positionally from a slice of [`Param`] values:
//!
//! ```no_run
//! use tmpup_core::{Connection, OpenMode, Param};
//!
//! # fn main() -> Result<(), tmpup_core::StorageError> {
//! let mut conn = Connection::open("tmpup.db", OpenMode::ReadWrite)?;
//! conn.execute(
//!     "DELETE FROM paste WHERE id = ? AND expires_at <= ?",
//!     &[Param::Text("abcd1234"), Param::Int(1_700_000_000)],
//! )?;
//! # Ok(())
//! # }
//! ```

/// Image repository.
pub mod image;
/// Paste repository.
pub mod paste;
/// Schema definition.
pub mod tables;
/// Timestamp column helpers.
pub mod time_util;


use crate::constants::BUSY_TIMEOUT_MS;
use crate::error::{StorageError, StorageErrorKind};
use chrono::{DateTime, Utc};
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{OpenFlags, Row, Statement, ToSql};
use std::path::Path;
use std::time::Duration;

pub use image::ImageDb;
pub use paste::PasteDb;

/// Opening mode for [`Connection::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-only access; the file must already exist.
    ReadOnly,
    /// Read-write access; the file is created when absent.
    ReadWrite,
}

/// A single positional statement parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param<'a> {
    Text(&'a str),
    Blob(&'a [u8]),
    Int(i64),
    /// Stored as integer epoch seconds.
    Timestamp(DateTime<Utc>),
    /// Stored as `0` or `1`.
    Flag(bool),
}

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match *self {
            Param::Text(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
            Param::Blob(blob) => ToSqlOutput::Borrowed(ValueRef::Blob(blob)),
            Param::Int(value) => ToSqlOutput::Owned(Value::Integer(value)),
            Param::Timestamp(at) => ToSqlOutput::Owned(Value::Integer(at.timestamp())),
            Param::Flag(flag) => ToSqlOutput::Owned(Value::Integer(i64::from(flag))),
        })
    }
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(value: &'a str) -> Self {
        Param::Text(value)
    }
}

impl<'a> From<&'a String> for Param<'a> {
    fn from(value: &'a String) -> Self {
        Param::Text(value.as_str())
    }
}

impl<'a> From<&'a [u8]> for Param<'a> {
    fn from(value: &'a [u8]) -> Self {
        Param::Blob(value)
    }
}

impl From<i64> for Param<'_> {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<DateTime<Utc>> for Param<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        Param::Timestamp(value)
    }
}

impl From<bool> for Param<'_> {
    fn from(value: bool) -> Self {
        Param::Flag(value)
    }
}

/// Database handle with its own error slot.
pub struct Connection {
    handle: rusqlite::Connection,
    error: String,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// SQLite silently downgrades an existing file it cannot write to a
/// read-only handle and only fails later with an unhelpful error at commit
/// time. Check write access ourselves before handing the path over.
fn ensure_writable(path: &Path) -> Result<(), StorageError> {
    match std::fs::OpenOptions::new().write(true).open(path) {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            let kind = if err.kind() == std::io::ErrorKind::PermissionDenied {
                StorageErrorKind::Permission
            } else {
                StorageErrorKind::Open
            };
            Err(StorageError::new(kind, format!("{}: {}", path.display(), err)))
        }
    }
}

fn open_flags(mode: OpenMode) -> OpenFlags {
    let base = OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI;
    match mode {
        OpenMode::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
        OpenMode::ReadWrite => {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        }
    }
}

/// Prepare `sql` and check its placeholder count against `params`.
///
/// # Panics
/// Panics when the statement declares a different number of placeholders
/// than supplied parameters; that is a bug in the caller's static SQL.
fn prepare<'c>(
    handle: &'c rusqlite::Connection,
    sql: &str,
    params: &[Param<'_>],
) -> rusqlite::Result<Statement<'c>> {
    let stmt = handle.prepare(sql)?;
    assert_eq!(
        stmt.parameter_count(),
        params.len(),
        "placeholder/parameter arity mismatch in statement: {}",
        sql
    );
    Ok(stmt)
}

fn run_to_completion(
    handle: &rusqlite::Connection,
    sql: &str,
    params: &[Param<'_>],
) -> rusqlite::Result<usize> {
    let mut stmt = prepare(handle, sql, params)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    while rows.next()?.is_some() {}
    Ok(usize::try_from(handle.changes()).unwrap_or(usize::MAX))
}

fn run_select<T, D>(
    handle: &rusqlite::Connection,
    out: &mut Vec<T>,
    row_limit: usize,
    sql: &str,
    params: &[Param<'_>],
    mut decode: D,
) -> rusqlite::Result<usize>
where
    D: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = prepare(handle, sql, params)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
    let mut count = 0;
    while count < row_limit {
        let Some(row) = rows.next()? else {
            break;
        };
        out.push(decode(row)?);
        count += 1;
    }
    Ok(count)
}

impl Connection {
    /// Open the database at `path`.
    ///
    /// # Arguments
    /// - `path`: Database file path (or an SQLite URI).
    /// - `mode`: Requested access mode.
    ///
    /// # Returns
    /// An open [`Connection`] with the busy timeout installed.
    ///
    /// # Errors
    /// Returns [`StorageErrorKind::Permission`] when `mode` is read-write and
    /// the file exists without write permission, and
    /// [`StorageErrorKind::Open`] when SQLite cannot open the file.
    pub fn open(path: &str, mode: OpenMode) -> Result<Self, StorageError> {
        if mode == OpenMode::ReadWrite {
            ensure_writable(Path::new(path))?;
        }

        let handle = rusqlite::Connection::open_with_flags(path, open_flags(mode)).map_err(
            |err| StorageError::new(StorageErrorKind::Open, format!("{}: {}", path, err)),
        )?;
        handle.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;

        Ok(Self {
            handle,
            error: String::new(),
        })
    }

    /// Create the database file if needed and install the schema.
    ///
    /// Runs once at startup so that later read-only openers find the tables.
    ///
    /// # Errors
    /// Returns an error when the file cannot be opened read-write or the
    /// schema script fails.
    pub fn initialize(path: &str) -> Result<(), StorageError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    StorageError::new(
                        StorageErrorKind::Open,
                        format!("{}: {}", parent.display(), err),
                    )
                })?;
            }
        }

        let mut conn = Self::open(path, OpenMode::ReadWrite)?;
        conn.execute_batch(tables::SCHEMA)
    }

    /// Diagnostic of the last failing operation on this connection.
    ///
    /// Empty until an operation fails; overwritten by the next failure.
    pub fn last_error(&self) -> &str {
        &self.error
    }

    fn record<T>(&mut self, result: rusqlite::Result<T>) -> Result<T, StorageError> {
        result.map_err(|err| {
            let err = StorageError::from(err);
            self.error.clone_from(&err.message);
            err
        })
    }

    /// Run one statement to completion, discarding any rows.
    ///
    /// # Returns
    /// Number of rows changed by the statement.
    ///
    /// # Errors
    /// Returns the engine diagnostic on prepare/bind/step failure.
    ///
    /// # Panics
    /// Panics on placeholder/parameter arity mismatch.
    pub fn execute(&mut self, sql: &str, params: &[Param<'_>]) -> Result<usize, StorageError> {
        let result = run_to_completion(&self.handle, sql, params);
        self.record(result)
    }

    /// Like [`Connection::execute`] but returns the engine row id of the
    /// inserted row.
    ///
    /// # Errors
    /// Returns the engine diagnostic on failure.
    ///
    /// # Panics
    /// Panics on placeholder/parameter arity mismatch.
    pub fn insert(&mut self, sql: &str, params: &[Param<'_>]) -> Result<i64, StorageError> {
        let result = run_to_completion(&self.handle, sql, params);
        self.record(result)?;
        Ok(self.handle.last_insert_rowid())
    }

    /// Execute one or more raw statements without parameters.
    ///
    /// # Errors
    /// Returns the engine diagnostic on failure.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), StorageError> {
        let result = self.handle.execute_batch(sql);
        self.record(result)
    }

    /// Run a query and decode at most `row_limit` rows into `out`.
    ///
    /// Rows are appended in the order the statement yields them; reading
    /// stops as soon as `row_limit` rows have been decoded.
    ///
    /// # Arguments
    /// - `out`: Caller-owned destination buffer.
    /// - `row_limit`: Maximum number of rows to decode.
    /// - `sql`: Query text with positional placeholders.
    /// - `params`: Values bound to the placeholders, in order.
    /// - `decode`: Converts one row into a record.
    ///
    /// # Returns
    /// Number of rows decoded, `0` when nothing matched.
    ///
    /// # Errors
    /// Returns the engine diagnostic when the query or a decode fails.
    ///
    /// # Panics
    /// Panics on placeholder/parameter arity mismatch.
    pub fn select<T, D>(
        &mut self,
        out: &mut Vec<T>,
        row_limit: usize,
        sql: &str,
        params: &[Param<'_>],
        decode: D,
    ) -> Result<usize, StorageError>
    where
        D: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let result = run_select(&self.handle, out, row_limit, sql, params, decode);
        self.record(result)
    }
}
