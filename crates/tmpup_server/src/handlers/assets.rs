//! Static files compiled into the binary.

use crate::request::Request;
use crate::response::Response;
use crate::AppContext;
use axum::http::StatusCode;

const ASSETS: &[(&str, &str, &[u8])] = &[(
    "style.css",
    "text/css; charset=utf-8",
    include_bytes!("../../assets/style.css"),
)];

/// Look up an embedded file by name.
pub fn lookup(name: &str) -> Option<(&'static str, &'static [u8])> {
    ASSETS
        .iter()
        .find(|(candidate, _, _)| *candidate == name)
        .map(|(_, mime, bytes)| (*mime, *bytes))
}

pub fn static_asset(_ctx: &AppContext, request: &Request, args: &[String]) -> Response {
    match args.first().and_then(|name| lookup(name)) {
        Some((mime, bytes)) => Response::asset(mime, bytes),
        None => Response::status(StatusCode::NOT_FOUND, request.mime()),
    }
}
