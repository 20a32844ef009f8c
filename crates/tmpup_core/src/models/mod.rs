//! Record types and request payloads for pastes and images.

/// Field validation helpers.
pub mod check;
/// Image records.
pub mod image;
/// Paste records.
pub mod paste;

#[cfg(test)]
mod tests;

pub use check::{ImageFormat, Lifetime};
pub use image::{CreateImageRequest, Image};
pub use paste::{CreatePasteRequest, Paste};

/// Treat blank submitted strings as absent.
///
/// # Returns
/// The trimmed value when non-empty, otherwise `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(ToOwned::to_owned)
}

fn or_default(value: Option<String>, default: &str) -> String {
    normalize_optional(value.as_deref()).unwrap_or_else(|| default.to_string())
}
