//! Image record and creation payload.

use super::check::{check_image, ImageFormat, Lifetime};
use super::or_default;
use crate::constants::{DEFAULT_AUTHOR, DEFAULT_FILENAME, DEFAULT_TITLE};
use crate::error::AppError;
use crate::naming::generate_id;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored image upload.
///
/// `data` travels as standard base64 in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub title: String,
    pub author: String,
    pub filename: String,
    #[serde(with = "base64_data")]
    pub data: Vec<u8>,
    #[serde(rename = "start", with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "end", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub visible: bool,
}

/// Request payload for creating an image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateImageRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub filename: Option<String>,
    #[serde(with = "base64_data")]
    pub data: Vec<u8>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    #[serde(default)]
    pub visible: bool,
}

impl Image {
    pub fn lifetime(&self) -> Lifetime {
        Lifetime {
            start: self.created_at,
            end: self.expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Detected container format, `None` for rows stored before validation.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::sniff(&self.data)
    }

    /// Inline `data:` URI for embedding the image in a page.
    pub fn data_uri(&self) -> Option<String> {
        self.format()
            .map(|format| format!("data:{};base64,{}", format.mime(), STANDARD.encode(&self.data)))
    }
}

impl CreateImageRequest {
    /// Validate the payload and build an image with a fresh identifier.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the payload is not a recognized
    /// image or the lifetime is invalid.
    pub fn into_image(self, now: DateTime<Utc>) -> Result<Image, AppError> {
        let lifetime = Lifetime::from_epoch(self.start, self.end, now)?;
        self.into_image_with(lifetime)
    }

    /// Same as [`CreateImageRequest::into_image`] with an explicit lifetime.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the payload is not an image.
    pub fn into_image_with(self, lifetime: Lifetime) -> Result<Image, AppError> {
        check_image(&self.data)?;
        Ok(Image {
            id: generate_id(),
            title: or_default(self.title, DEFAULT_TITLE),
            author: or_default(self.author, DEFAULT_AUTHOR),
            filename: or_default(self.filename, DEFAULT_FILENAME),
            data: self.data,
            created_at: lifetime.start,
            expires_at: lifetime.end,
            visible: self.visible,
        })
    }
}

mod base64_data {
    use super::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.trim())
            .map_err(|_| serde::de::Error::custom("invalid base64 data"))
    }
}
