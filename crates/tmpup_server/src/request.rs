//! Transport-independent request shape consumed by the dispatcher.

use crate::response::Mime;
use crate::router::Method;
use axum::extract::{FromRequest, Multipart, Query};
use axum::http::{header, request::Parts, HeaderMap};
use axum::Form;
use tmpup_core::AppError;

/// One submitted field from the query string or body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: Vec<u8>,
    /// Client-side file name for multipart file parts.
    pub filename: Option<String>,
}

impl Field {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into().into_bytes(),
            filename: None,
        }
    }
}

/// Decoded request: verb, path and fields.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub fields: Vec<Field>,
    pub wants_json: bool,
}

impl Request {
    /// Build a request without going through HTTP decoding.
    pub fn new(method: Method, path: impl Into<String>, fields: Vec<Field>) -> Self {
        let path = path.into();
        Self {
            method,
            wants_json: path.starts_with("/api/"),
            path,
            fields,
        }
    }

    /// First field named `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// First field named `name` as UTF-8 text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name)
            .and_then(|field| std::str::from_utf8(&field.value).ok())
    }

    pub fn mime(&self) -> Mime {
        if self.wants_json {
            Mime::Json
        } else {
            Mime::Html
        }
    }

    /// Decode an HTTP request into fields.
    ///
    /// Query parameters come first, followed by the body: url-encoded and
    /// multipart forms yield one field per entry, JSON yields a single field
    /// named `json`, other bodies are ignored.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when the body cannot be decoded or
    /// exceeds `body_limit`.
    pub async fn from_http(req: axum::extract::Request, body_limit: usize) -> Result<Self, AppError> {
        let (parts, body) = req.into_parts();
        let method = Method::from_http(&parts.method);
        let path = parts.uri.path().to_string();
        let wants_json = wants_json(&path, &parts.headers);

        let mut fields = query_fields(&parts)?;
        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let req = axum::extract::Request::from_parts(parts, body);
            let mut multipart = Multipart::from_request(req, &())
                .await
                .map_err(|rejection| AppError::invalid(rejection.body_text()))?;
            while let Some(part) = multipart
                .next_field()
                .await
                .map_err(|err| AppError::invalid(err.body_text()))?
            {
                let name = part.name().unwrap_or_default().to_string();
                let filename = part.file_name().map(ToOwned::to_owned);
                let value = part
                    .bytes()
                    .await
                    .map_err(|err| AppError::invalid(err.body_text()))?;
                fields.push(Field {
                    name,
                    value: value.to_vec(),
                    filename,
                });
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let req = axum::extract::Request::from_parts(parts, body);
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, &())
                .await
                .map_err(|rejection| AppError::invalid(rejection.body_text()))?;
            fields.extend(pairs.into_iter().map(|(name, value)| Field::text(name, value)));
        } else if content_type.starts_with("application/json") {
            let bytes = axum::body::to_bytes(body, body_limit)
                .await
                .map_err(|_| AppError::invalid("request body too large"))?;
            let text = String::from_utf8(bytes.to_vec())
                .map_err(|_| AppError::invalid("request body is not valid UTF-8"))?;
            fields.push(Field::text("json", text));
        }

        Ok(Self {
            method,
            path,
            fields,
            wants_json,
        })
    }
}

/// Whether the client expects JSON back.
pub fn wants_json(path: &str, headers: &HeaderMap) -> bool {
    path.starts_with("/api/")
        || headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"))
}

fn query_fields(parts: &Parts) -> Result<Vec<Field>, AppError> {
    if parts.uri.query().is_none() {
        return Ok(Vec::new());
    }
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map_err(|rejection| AppError::invalid(rejection.body_text()))?;
    Ok(pairs
        .into_iter()
        .map(|(name, value)| Field::text(name, value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn http(method: &str, uri: &str, content_type: Option<&str>, body: &'static str) -> axum::extract::Request {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).expect("request")
    }

    #[tokio::test]
    async fn query_and_form_fields_are_collected_in_order() {
        let req = http(
            "POST",
            "/paste/new?title=from+query",
            Some("application/x-www-form-urlencoded"),
            "code=hello%20world&visible=on",
        );
        let request = Request::from_http(req, 1024).await.expect("decode");

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/paste/new");
        assert_eq!(request.text("title"), Some("from query"));
        assert_eq!(request.text("code"), Some("hello world"));
        assert_eq!(request.text("visible"), Some("on"));
        assert!(!request.wants_json);
    }

    #[tokio::test]
    async fn json_body_becomes_single_field() {
        let req = http("POST", "/api/v0/paste", Some("application/json"), r#"{"code":"x"}"#);
        let request = Request::from_http(req, 1024).await.expect("decode");

        assert!(request.wants_json);
        assert_eq!(request.fields.len(), 1);
        assert_eq!(request.text("json"), Some(r#"{"code":"x"}"#));
    }

    #[tokio::test]
    async fn oversize_json_body_is_rejected() {
        let req = http("POST", "/api/v0/paste", Some("application/json"), r#"{"code":"xxxxxxxx"}"#);
        assert!(matches!(
            Request::from_http(req, 4).await,
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn accept_header_selects_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json("/paste/abc", &headers));
        headers.insert(
            header::ACCEPT,
            "text/html, application/json;q=0.9".parse().expect("header"),
        );
        assert!(wants_json("/paste/abc", &headers));
        assert!(wants_json("/api/v0/paste", &HeaderMap::new()));
    }
}
