//! Shared constants used across tmpup crates.

/// Default HTTP port for the tmpup daemon.
pub const DEFAULT_PORT: u16 = 8090;

/// Server the `tmpup` client talks to when no host is given.
pub const DEFAULT_CLI_HOST: &str = "http://localhost:8090";

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "tmpup.db";

/// Default maximum body size accepted by the HTTP layer.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 8 * 1024 * 1024;

/// Default period between two prune passes, in seconds.
pub const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 60;

/// SQLite busy timeout applied to every connection, in milliseconds.
pub const BUSY_TIMEOUT_MS: u64 = 30_000;

/// Maximum length of the per-connection error slot.
pub const DB_ERROR_MAX: usize = 128;

/// Length of generated record identifiers.
pub const ID_LEN: usize = 8;

/// Number of records shown in the index "recent" tables.
pub const RECENT_LIMIT: usize = 10;

pub const DEFAULT_TITLE: &str = "void";
pub const DEFAULT_AUTHOR: &str = "anon";
pub const DEFAULT_FILENAME: &str = "box";
pub const DEFAULT_LANGUAGE: &str = "nohighlight";

pub const DURATION_HOUR: i64 = 3_600;
pub const DURATION_DAY: i64 = 86_400;
pub const DURATION_WEEK: i64 = 604_800;
/// Longest accepted lifetime (31 days).
pub const DURATION_MONTH: i64 = 2_678_400;

/// Named durations offered by the HTML forms, shortest first.
pub const DURATIONS: &[(&str, i64)] = &[
    ("hour", DURATION_HOUR),
    ("day", DURATION_DAY),
    ("week", DURATION_WEEK),
    ("month", DURATION_MONTH),
];

/// Duration used by forms when none is submitted.
pub const DEFAULT_DURATION: &str = "day";
