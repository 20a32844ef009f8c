//! Validation of submitted fields: languages, lifetimes and image payloads.

use crate::constants::{DURATIONS, DURATION_HOUR, DURATION_MONTH};
use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};

/// Highlight tags accepted for pastes, sorted for binary search.
pub const LANGUAGES: &[&str] = &[
    "bash",
    "c",
    "cpp",
    "csharp",
    "css",
    "diff",
    "go",
    "haskell",
    "html",
    "ini",
    "java",
    "javascript",
    "json",
    "kotlin",
    "lua",
    "makefile",
    "markdown",
    "nohighlight",
    "perl",
    "php",
    "plaintext",
    "python",
    "ruby",
    "rust",
    "shell",
    "sql",
    "swift",
    "toml",
    "typescript",
    "xml",
    "yaml",
];

/// Reject languages outside [`LANGUAGES`].
///
/// # Errors
/// Returns [`AppError::Validation`] naming the offending tag.
pub fn check_language(language: &str) -> Result<(), AppError> {
    LANGUAGES
        .binary_search(&language)
        .map(|_| ())
        .map_err(|_| AppError::invalid(format!("invalid language '{}'", language)))
}

/// Validity window of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifetime {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Lifetime {
    /// Build a lifetime, enforcing `start < end` and a one month maximum.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the window is empty, reversed,
    /// or longer than [`DURATION_MONTH`].
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if end <= start {
            return Err(AppError::invalid("end date is prior start"));
        }
        if (end - start).num_seconds() > DURATION_MONTH {
            return Err(AppError::invalid("too long duration"));
        }
        Ok(Self { start, end })
    }

    /// Build a lifetime from optional epoch seconds as submitted over the API.
    ///
    /// A missing start is `now`; a missing end is one hour after start.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for out-of-range timestamps or an
    /// invalid window.
    pub fn from_epoch(
        start: Option<i64>,
        end: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Self, AppError> {
        let start = match start {
            Some(secs) => DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| AppError::invalid("invalid start date"))?,
            None => now,
        };
        let end = match end {
            Some(secs) => DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| AppError::invalid("invalid end date"))?,
            None => start
                .checked_add_signed(Duration::seconds(DURATION_HOUR))
                .ok_or_else(|| AppError::invalid("invalid end date"))?,
        };
        Self::new(start, end)
    }

    /// Build a lifetime starting `now` from a named duration (`hour`, `day`…).
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for unknown names or an end past the
    /// representable range.
    pub fn named(name: &str, now: DateTime<Utc>) -> Result<Self, AppError> {
        let secs = duration_secs(name)
            .ok_or_else(|| AppError::invalid(format!("invalid duration '{}'", name)))?;
        let end = now
            .checked_add_signed(Duration::seconds(secs))
            .ok_or_else(|| AppError::invalid("invalid end date"))?;
        Self::new(now, end)
    }

    /// Human readable time left before expiration, e.g. `"3 hours"`.
    pub fn remaining(&self, now: DateTime<Utc>) -> String {
        describe_gap((self.end - now).num_seconds().max(0))
    }
}

/// Seconds of a named duration from [`DURATIONS`].
pub fn duration_secs(name: &str) -> Option<i64> {
    let name = name.trim();
    DURATIONS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, secs)| *secs)
}

fn describe_gap(secs: i64) -> String {
    const DAY: i64 = 86_400;
    if secs < DURATION_HOUR {
        format!("{} minutes", secs / 60)
    } else if secs < DAY {
        format!("{} hours", secs / DURATION_HOUR)
    } else {
        format!("{} days", secs / DAY)
    }
}

/// Image container formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Identify the format from the leading magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if data.starts_with(&[0xff, 0xd8, 0xff]) {
            Some(Self::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    /// MIME type served for inline display.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// Reject payloads that are not a recognized image.
///
/// # Errors
/// Returns [`AppError::Validation`] with `"not a valid image"`.
pub fn check_image(data: &[u8]) -> Result<ImageFormat, AppError> {
    ImageFormat::sniff(data).ok_or_else(|| AppError::invalid("not a valid image"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("timestamp")
    }

    #[test]
    fn languages_are_sorted_for_binary_search() {
        let mut sorted = LANGUAGES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, LANGUAGES);
    }

    #[test]
    fn check_language_accepts_known_and_rejects_unknown() {
        assert!(check_language("rust").is_ok());
        assert!(check_language("nohighlight").is_ok());
        let err = check_language("brainfuck").expect_err("unknown language");
        assert_eq!(err.to_string(), "invalid language 'brainfuck'");
    }

    #[test]
    fn lifetime_rejects_reversed_and_overlong_windows() {
        let cases = [
            (at(100), at(100), "end date is prior start"),
            (at(100), at(50), "end date is prior start"),
            (at(0), at(DURATION_MONTH + 1), "too long duration"),
        ];
        for (start, end, message) in cases {
            let err = Lifetime::new(start, end).expect_err("invalid window");
            assert_eq!(err.to_string(), message);
        }
        assert!(Lifetime::new(at(0), at(DURATION_MONTH)).is_ok());
    }

    #[test]
    fn from_epoch_fills_missing_bounds() {
        let now = at(1_000);
        let lifetime = Lifetime::from_epoch(None, None, now).expect("defaults");
        assert_eq!(lifetime.start, now);
        assert_eq!(lifetime.end, at(1_000 + DURATION_HOUR));

        let explicit = Lifetime::from_epoch(Some(10), Some(20), now).expect("explicit");
        assert_eq!(explicit, Lifetime { start: at(10), end: at(20) });
    }

    #[test]
    fn default_end_past_the_calendar_is_rejected() {
        let last = DateTime::<Utc>::MAX_UTC.timestamp();
        let err = Lifetime::from_epoch(Some(last), None, at(0)).expect_err("overflow");
        assert_eq!(err.to_string(), "invalid end date");

        let err = Lifetime::named("month", DateTime::<Utc>::MAX_UTC).expect_err("overflow");
        assert_eq!(err.to_string(), "invalid end date");

        let err = Lifetime::from_epoch(Some(i64::MAX), None, at(0)).expect_err("start");
        assert_eq!(err.to_string(), "invalid start date");
    }

    #[test]
    fn named_durations_resolve_case_insensitively() {
        let now = at(0);
        let week = Lifetime::named("Week", now).expect("week");
        assert_eq!((week.end - week.start).num_seconds(), 604_800);
        assert!(Lifetime::named("fortnight", now).is_err());
    }

    #[test]
    fn remaining_picks_unit_by_magnitude() {
        let lifetime = Lifetime::new(at(0), at(DURATION_MONTH)).expect("lifetime");
        assert_eq!(lifetime.remaining(at(DURATION_MONTH - 600)), "10 minutes");
        assert_eq!(lifetime.remaining(at(DURATION_MONTH - 7_200)), "2 hours");
        assert_eq!(lifetime.remaining(at(0)), "31 days");
        assert_eq!(lifetime.remaining(at(DURATION_MONTH + 5)), "0 minutes");
    }

    #[test]
    fn sniff_recognizes_common_image_headers() {
        let cases: [(&[u8], Option<ImageFormat>); 5] = [
            (b"\x89PNG\r\n\x1a\nrest", Some(ImageFormat::Png)),
            (&[0xff, 0xd8, 0xff, 0xe0], Some(ImageFormat::Jpeg)),
            (b"GIF89a....", Some(ImageFormat::Gif)),
            (b"RIFF\x00\x00\x00\x00WEBPVP8 ", Some(ImageFormat::Webp)),
            (b"plain text", None),
        ];
        for (data, expected) in cases {
            assert_eq!(ImageFormat::sniff(data), expected);
        }
        assert_eq!(
            check_image(b"nope").expect_err("text").to_string(),
            "not a valid image"
        );
    }
}
