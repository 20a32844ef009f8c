//! Paste record and creation payload.

use super::check::{check_language, Lifetime};
use super::{normalize_optional, or_default};
use crate::constants::{DEFAULT_AUTHOR, DEFAULT_FILENAME, DEFAULT_LANGUAGE, DEFAULT_TITLE};
use crate::error::AppError;
use crate::naming::generate_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored text snippet.
///
/// Timestamps travel as epoch seconds under the `start`/`end` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub title: String,
    pub author: String,
    pub filename: String,
    pub language: String,
    pub code: String,
    #[serde(rename = "start", with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "end", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub visible: bool,
}

/// Request payload for creating a paste (JSON API or HTML form).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePasteRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub filename: Option<String>,
    pub language: Option<String>,
    pub code: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    #[serde(default)]
    pub visible: bool,
}

impl Paste {
    /// Lifetime window of this paste.
    pub fn lifetime(&self) -> Lifetime {
        Lifetime {
            start: self.created_at,
            end: self.expires_at,
        }
    }

    /// Whether the paste is past its expiration at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl CreatePasteRequest {
    /// Validate the payload and build a paste with a fresh identifier.
    ///
    /// Missing `start` means `now`; missing `end` means one hour after start.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the code is empty, the language
    /// is unknown or the lifetime is invalid.
    pub fn into_paste(self, now: DateTime<Utc>) -> Result<Paste, AppError> {
        let lifetime = Lifetime::from_epoch(self.start, self.end, now)?;
        self.into_paste_with(lifetime)
    }

    /// Same as [`CreatePasteRequest::into_paste`] with an explicit lifetime,
    /// ignoring `start` and `end`.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the code is empty or the
    /// language is unknown.
    pub fn into_paste_with(self, lifetime: Lifetime) -> Result<Paste, AppError> {
        if self.code.trim().is_empty() {
            return Err(AppError::invalid("empty code"));
        }
        let language = normalize_optional(self.language.as_deref())
            .map(|language| language.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        check_language(&language)?;

        Ok(Paste {
            id: generate_id(),
            title: or_default(self.title, DEFAULT_TITLE),
            author: or_default(self.author, DEFAULT_AUTHOR),
            filename: or_default(self.filename, DEFAULT_FILENAME),
            language,
            code: self.code,
            created_at: lifetime.start,
            expires_at: lifetime.end,
            visible: self.visible,
        })
    }
}
