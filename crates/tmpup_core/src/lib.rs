//! Core domain library for tmpup (config, storage, models, maintenance).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants (durations, defaults, limits).
pub mod constants;
/// SQLite adapter and entity repositories.
pub mod db;
/// Application error types (storage/domain).
pub mod error;
/// Periodic pruning of expired records.
pub mod maint;
/// Paste and image records plus request payloads.
pub mod models;
/// Identifier generation.
pub mod naming;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_CLI_HOST, DEFAULT_PORT};
pub use db::{Connection, OpenMode, Param};
pub use error::{AppError, StorageError, StorageErrorKind};
pub use maint::Maintenance;
