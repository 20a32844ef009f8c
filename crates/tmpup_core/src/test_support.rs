//! Shared test-only helpers for tmpup_core.

use crate::db::Connection;
use tempfile::TempDir;

/// Creates an isolated database with the schema installed.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing file.
///
/// # Returns
/// The database path and its owning [`TempDir`].
///
/// # Panics
/// Panics if temp-dir creation or schema initialization fails.
pub(crate) fn setup_temp_db() -> (String, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_str()
        .expect("db path")
        .to_string();
    Connection::initialize(&db_path).expect("initialize");
    (db_path, temp_dir)
}
