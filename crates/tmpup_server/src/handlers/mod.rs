//! Route handlers.
//!
//! Every handler has the [`crate::router::Handler`] shape and runs on a
//! blocking worker thread with its own storage connection.

/// JSON API under `/api/v0`.
pub mod api;
/// Embedded static files.
pub mod assets;
/// Image pages and downloads.
pub mod image;
/// Landing page.
pub mod index;
/// Paste pages and downloads.
pub mod paste;

use crate::request::Request;
use crate::response::{Mime, Response};
use tmpup_core::AppError;

/// Collapse a handler result into a response.
pub(crate) fn respond(result: Result<Response, AppError>, mime: Mime) -> Response {
    result.unwrap_or_else(|err| Response::from_error(&err, mime))
}

/// First captured argument as a lowercase identifier.
pub(crate) fn id_arg(args: &[String]) -> Result<String, AppError> {
    args.first()
        .map(|id| id.to_ascii_lowercase())
        .ok_or(AppError::NotFound)
}

/// Optional text field with blanks treated as absent.
pub(crate) fn text_field(request: &Request, name: &str) -> Option<String> {
    tmpup_core::models::normalize_optional(request.text(name))
}

/// HTML checkbox state.
pub(crate) fn checkbox(request: &Request, name: &str) -> bool {
    matches!(request.text(name), Some("on" | "true" | "1"))
}
