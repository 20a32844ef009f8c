//! Image storage operations.

use super::time_util::timestamp_column;
use super::{Connection, Param};
use crate::error::StorageError;
use crate::maint::Prune;
use crate::models::Image;
use chrono::{DateTime, Utc};
use rusqlite::Row;

const SQL_SAVE: &str = "INSERT INTO image(id, title, author, filename, data, created_at, \
                        expires_at, visible) VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

const SQL_GET: &str = "SELECT id, title, author, filename, data, created_at, expires_at, \
                       visible FROM image WHERE id = ?";

const SQL_RECENT: &str = "SELECT id, title, author, filename, data, created_at, expires_at, \
                          visible FROM image \
                          WHERE visible = 1 AND expires_at > ? \
                          ORDER BY created_at DESC, rowid DESC LIMIT ?";

const SQL_DELETE: &str = "DELETE FROM image WHERE id = ?";

const SQL_PRUNE: &str = "DELETE FROM image WHERE expires_at <= ?";

fn decode(row: &Row<'_>) -> rusqlite::Result<Image> {
    Ok(Image {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        filename: row.get(3)?,
        data: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
        expires_at: timestamp_column(row, 6)?,
        visible: row.get(7)?,
    })
}

/// Accessor for the `image` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDb;

impl ImageDb {
    /// Insert a new image row. The identifier must already be assigned.
    ///
    /// # Errors
    /// Returns the engine diagnostic, including primary-key conflicts.
    pub fn save(&self, image: &Image, conn: &mut Connection) -> Result<(), StorageError> {
        let rowid = conn.insert(
            SQL_SAVE,
            &[
                Param::from(&image.id),
                Param::from(&image.title),
                Param::from(&image.author),
                Param::from(&image.filename),
                Param::Blob(&image.data),
                Param::from(image.created_at),
                Param::from(image.expires_at),
                Param::from(image.visible),
            ],
        )?;
        tracing::trace!(id = %image.id, rowid, bytes = image.data.len(), "image row inserted");
        Ok(())
    }

    /// Load an image by identifier, `Ok(None)` when absent.
    ///
    /// # Errors
    /// Returns the engine diagnostic on query or decode failure.
    pub fn get(&self, id: &str, conn: &mut Connection) -> Result<Option<Image>, StorageError> {
        let mut found = Vec::with_capacity(1);
        conn.select(&mut found, 1, SQL_GET, &[Param::Text(id)], decode)?;
        Ok(found.pop())
    }

    /// Visible, unexpired images, newest first, at most `max`.
    ///
    /// # Errors
    /// Returns the engine diagnostic on query or decode failure.
    pub fn list_recent(
        &self,
        max: usize,
        now: DateTime<Utc>,
        conn: &mut Connection,
    ) -> Result<Vec<Image>, StorageError> {
        let mut images = Vec::with_capacity(max);
        let limit = i64::try_from(max).unwrap_or(i64::MAX);
        conn.select(
            &mut images,
            max,
            SQL_RECENT,
            &[Param::Timestamp(now), Param::Int(limit)],
            decode,
        )?;
        Ok(images)
    }

    /// Delete the row of `image`, `true` when a row was removed.
    ///
    /// # Errors
    /// Returns the engine diagnostic on failure.
    pub fn delete(&self, image: &Image, conn: &mut Connection) -> Result<bool, StorageError> {
        Ok(conn.execute(SQL_DELETE, &[Param::from(&image.id)])? > 0)
    }

    /// Remove every image whose expiration is at or before `now`.
    ///
    /// # Errors
    /// Returns the engine diagnostic on failure.
    pub fn prune(&self, now: DateTime<Utc>, conn: &mut Connection) -> Result<usize, StorageError> {
        conn.execute(SQL_PRUNE, &[Param::Timestamp(now)])
    }
}

impl Prune for ImageDb {
    fn name(&self) -> &'static str {
        "image"
    }

    fn prune(&self, now: DateTime<Utc>, conn: &mut Connection) -> Result<usize, StorageError> {
        ImageDb::prune(self, now, conn)
    }
}
