//! Paste storage operations.

use super::time_util::timestamp_column;
use super::{Connection, Param};
use crate::error::StorageError;
use crate::maint::Prune;
use crate::models::Paste;
use chrono::{DateTime, Utc};
use rusqlite::Row;

const SQL_SAVE: &str = "INSERT INTO paste(id, title, author, filename, language, code, \
                        created_at, expires_at, visible) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

const SQL_GET: &str = "SELECT id, title, author, filename, language, code, created_at, \
                       expires_at, visible FROM paste WHERE id = ?";

const SQL_RECENT: &str = "SELECT id, title, author, filename, language, code, created_at, \
                          expires_at, visible FROM paste \
                          WHERE visible = 1 AND expires_at > ? \
                          ORDER BY created_at DESC, rowid DESC LIMIT ?";

const SQL_DELETE: &str = "DELETE FROM paste WHERE id = ?";

const SQL_PRUNE: &str = "DELETE FROM paste WHERE expires_at <= ?";

fn decode(row: &Row<'_>) -> rusqlite::Result<Paste> {
    Ok(Paste {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        filename: row.get(3)?,
        language: row.get(4)?,
        code: row.get(5)?,
        created_at: timestamp_column(row, 6)?,
        expires_at: timestamp_column(row, 7)?,
        visible: row.get(8)?,
    })
}

/// Accessor for the `paste` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasteDb;

impl PasteDb {
    /// Insert a new paste row.
    ///
    /// The identifier must already be assigned; this never generates ids.
    ///
    /// # Errors
    /// Returns the engine diagnostic, including primary-key conflicts.
    pub fn save(&self, paste: &Paste, conn: &mut Connection) -> Result<(), StorageError> {
        let rowid = conn.insert(
            SQL_SAVE,
            &[
                Param::from(&paste.id),
                Param::from(&paste.title),
                Param::from(&paste.author),
                Param::from(&paste.filename),
                Param::from(&paste.language),
                Param::from(&paste.code),
                Param::from(paste.created_at),
                Param::from(paste.expires_at),
                Param::from(paste.visible),
            ],
        )?;
        tracing::trace!(id = %paste.id, rowid, "paste row inserted");
        Ok(())
    }

    /// Load a paste by identifier.
    ///
    /// Expired rows not yet pruned are still returned.
    ///
    /// # Returns
    /// `Ok(None)` when no row carries `id`.
    ///
    /// # Errors
    /// Returns the engine diagnostic on query or decode failure.
    pub fn get(&self, id: &str, conn: &mut Connection) -> Result<Option<Paste>, StorageError> {
        let mut found = Vec::with_capacity(1);
        conn.select(&mut found, 1, SQL_GET, &[Param::Text(id)], decode)?;
        Ok(found.pop())
    }

    /// Visible, unexpired pastes, newest first, at most `max`.
    ///
    /// # Errors
    /// Returns the engine diagnostic on query or decode failure.
    pub fn list_recent(
        &self,
        max: usize,
        now: DateTime<Utc>,
        conn: &mut Connection,
    ) -> Result<Vec<Paste>, StorageError> {
        let mut pastes = Vec::with_capacity(max);
        let limit = i64::try_from(max).unwrap_or(i64::MAX);
        conn.select(
            &mut pastes,
            max,
            SQL_RECENT,
            &[Param::Timestamp(now), Param::Int(limit)],
            decode,
        )?;
        Ok(pastes)
    }

    /// Delete the row of `paste`.
    ///
    /// # Returns
    /// `true` when a row was removed.
    ///
    /// # Errors
    /// Returns the engine diagnostic on failure.
    pub fn delete(&self, paste: &Paste, conn: &mut Connection) -> Result<bool, StorageError> {
        Ok(conn.execute(SQL_DELETE, &[Param::from(&paste.id)])? > 0)
    }

    /// Remove every paste whose expiration is at or before `now`.
    ///
    /// # Returns
    /// Number of rows removed, `0` when nothing expired.
    ///
    /// # Errors
    /// Returns the engine diagnostic on failure.
    pub fn prune(&self, now: DateTime<Utc>, conn: &mut Connection) -> Result<usize, StorageError> {
        conn.execute(SQL_PRUNE, &[Param::Timestamp(now)])
    }
}

impl Prune for PasteDb {
    fn name(&self) -> &'static str {
        "paste"
    }

    fn prune(&self, now: DateTime<Utc>, conn: &mut Connection) -> Result<usize, StorageError> {
        PasteDb::prune(self, now, conn)
    }
}
