//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_DB_PATH, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_PORT, DEFAULT_PRUNE_INTERVAL_SECS,
};
use std::env;
use std::time::Duration;

/// Runtime configuration for the tmpup daemon.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_upload_size: usize,
    pub prune_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            port: DEFAULT_PORT,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            prune_interval_secs: DEFAULT_PRUNE_INTERVAL_SECS,
        }
    }
}

/// Expand a leading `~/` using `HOME`.
fn expand_tilde(path: String) -> String {
    match (path.strip_prefix("~/"), env::var("HOME")) {
        (Some(rest), Ok(home)) if !home.trim().is_empty() => {
            std::path::Path::new(&home).join(rest).to_string_lossy().into_owned()
        }
        _ => path,
    }
}

/// Parse a boolean-like environment flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off` and the
/// empty string. Matching is case-insensitive and ignores surrounding
/// whitespace; anything else yields `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment, `false` when missing or invalid.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("DB_PATH")
                .map(expand_tilde)
                .unwrap_or(defaults.db_path),
            port: env_parsed("PORT").unwrap_or(defaults.port),
            max_upload_size: env_parsed("MAX_UPLOAD_SIZE").unwrap_or(defaults.max_upload_size),
            prune_interval_secs: env_parsed("PRUNE_INTERVAL")
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.prune_interval_secs),
        }
    }

    /// Period between two maintenance passes.
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values_and_rejects_garbage() {
        for value in ["", "0", "false", " No ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
        assert_eq!(parse_env_flag("maybe"), None);
    }

    #[test]
    fn expand_tilde_leaves_plain_paths_untouched() {
        assert_eq!(expand_tilde("/var/db/tmpup.db".into()), "/var/db/tmpup.db");
        assert_eq!(expand_tilde("tmpup.db".into()), "tmpup.db");
    }

    #[test]
    fn prune_interval_never_reaches_zero() {
        let config = Config {
            prune_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.prune_interval(), Duration::from_secs(1));
    }
}
