//! Epoch-seconds conversion for timestamp columns.

use chrono::{DateTime, Utc};
use rusqlite::Row;

/// Read an integer epoch-seconds column as a UTC timestamp.
pub(crate) fn timestamp_column(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(index)?;
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(index, secs))
}

/// Current time truncated to whole seconds, the precision stored on disk.
pub fn now_seconds() -> DateTime<Utc> {
    let now = Utc::now().timestamp();
    DateTime::from_timestamp(now, 0).unwrap_or_else(Utc::now)
}
