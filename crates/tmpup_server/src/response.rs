//! Response construction and status helpers.

use crate::templates;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::{json, Value};
use tmpup_core::{AppError, StorageErrorKind};

/// Representation preferred by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mime {
    Html,
    Json,
}

/// Fully materialized HTTP response produced by a handler.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Human readable message for `code`.
pub fn status_message(code: StatusCode) -> &'static str {
    match code {
        StatusCode::CREATED => "Created",
        StatusCode::BAD_REQUEST => "Bad request",
        StatusCode::NOT_FOUND => "Not found",
        StatusCode::INTERNAL_SERVER_ERROR => "Internal server error",
        _ => "unknown error",
    }
}

impl Response {
    fn with_type(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status,
            headers,
            body,
        }
    }

    fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Bare status response in the requested representation.
    ///
    /// HTML carries the status message; JSON carries `{"error": message}`,
    /// or `{"status": message}` for non-error codes.
    pub fn status(code: StatusCode, mime: Mime) -> Self {
        let message = status_message(code);
        match mime {
            Mime::Html => Self::html(code, templates::status(code.as_u16(), message)),
            Mime::Json if code.as_u16() < 400 => Self::json(code, json!({ "status": message })),
            Mime::Json => Self::json(code, json!({ "error": message })),
        }
    }

    pub fn json(code: StatusCode, value: Value) -> Self {
        Self::with_type(code, "application/json", value.to_string().into_bytes())
    }

    /// Serialize `value` as the JSON body, 500 when serialization fails.
    pub fn json_of<T: serde::Serialize>(code: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::with_type(code, "application/json", body),
            Err(err) => {
                tracing::error!("failed to serialize response: {}", err);
                Self::status(StatusCode::INTERNAL_SERVER_ERROR, Mime::Json)
            }
        }
    }

    pub fn html(code: StatusCode, body: String) -> Self {
        Self::with_type(code, "text/html; charset=utf-8", body.into_bytes())
    }

    /// Attachment download of `bytes` under `filename`.
    pub fn download(filename: &str, bytes: Vec<u8>) -> Self {
        let disposition = format!("attachment; filename=\"{}\"", header_safe(filename));
        let length = HeaderValue::from(bytes.len());
        let response = Self::with_type(StatusCode::OK, "application/octet-stream", bytes)
            .header(header::CONTENT_LENGTH, length);
        match HeaderValue::from_str(&disposition) {
            Ok(value) => response.header(header::CONTENT_DISPOSITION, value),
            Err(_) => response.header(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment"),
            ),
        }
    }

    /// `302 Found` pointing at `location`.
    pub fn redirect(location: &str) -> Self {
        match HeaderValue::from_str(location) {
            Ok(value) => Self {
                status: StatusCode::FOUND,
                headers: HeaderMap::new(),
                body: Vec::new(),
            }
            .header(header::LOCATION, value),
            Err(_) => {
                tracing::error!("refusing redirect to invalid location {:?}", location);
                Self::status(StatusCode::INTERNAL_SERVER_ERROR, Mime::Html)
            }
        }
    }

    /// Embedded static file.
    pub fn asset(mime: &'static str, bytes: &'static [u8]) -> Self {
        Self::with_type(StatusCode::OK, mime, bytes.to_vec())
            .header(header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600"))
    }

    /// Map a domain error onto a response.
    ///
    /// Storage diagnostics are logged and never sent to the client.
    pub fn from_error(err: &AppError, mime: Mime) -> Self {
        match err {
            AppError::NotFound => Self::status(StatusCode::NOT_FOUND, mime),
            AppError::Validation(message) => {
                tracing::debug!("rejected request: {}", message);
                match mime {
                    Mime::Json => Self::json(StatusCode::BAD_REQUEST, json!({ "error": message })),
                    Mime::Html => Self::html(
                        StatusCode::BAD_REQUEST,
                        templates::status(400, message),
                    ),
                }
            }
            AppError::Storage(storage) => {
                if storage.kind == StorageErrorKind::Busy {
                    tracing::warn!("database busy: {}", storage);
                } else {
                    tracing::error!("storage failure ({:?}): {}", storage.kind, storage);
                }
                Self::status(StatusCode::INTERNAL_SERVER_ERROR, mime)
            }
        }
    }
}

impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.headers, self.body).into_response()
    }
}

fn header_safe(filename: &str) -> String {
    filename
        .chars()
        .map(|ch| match ch {
            '"' | '\\' => '_',
            ch if ch.is_control() || !ch.is_ascii() => '_',
            ch => ch,
        })
        .collect()
}
