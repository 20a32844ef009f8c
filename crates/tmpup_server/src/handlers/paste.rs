//! Paste pages: creation form, display and raw download.

use super::{checkbox, id_arg, respond, text_field};
use crate::request::Request;
use crate::response::{Mime, Response};
use crate::templates;
use crate::AppContext;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use tmpup_core::constants::DEFAULT_DURATION;
use tmpup_core::db::time_util::now_seconds;
use tmpup_core::db::PasteDb;
use tmpup_core::models::{CreatePasteRequest, Lifetime, Paste};
use tmpup_core::{AppError, OpenMode};
use tracing::{debug, info};

/// Load an unexpired paste.
///
/// # Errors
/// Returns [`AppError::NotFound`] for unknown ids and rows that expired but
/// have not been pruned yet.
pub(crate) fn load(ctx: &AppContext, id: &str, now: DateTime<Utc>) -> Result<Paste, AppError> {
    let mut conn = ctx.open(OpenMode::ReadOnly)?;
    match PasteDb.get(id, &mut conn)? {
        Some(paste) if !paste.is_expired_at(now) => Ok(paste),
        Some(_) => {
            debug!(id, "paste expired, awaiting prune");
            Err(AppError::NotFound)
        }
        None => Err(AppError::NotFound),
    }
}

/// Persist a validated paste on a fresh read-write connection.
pub(crate) fn store(ctx: &AppContext, paste: &Paste) -> Result<(), AppError> {
    let mut conn = ctx.open(OpenMode::ReadWrite)?;
    PasteDb.save(paste, &mut conn)?;
    info!(id = %paste.id, language = %paste.language, "created paste");
    Ok(())
}

pub fn paste_new(_ctx: &AppContext, _request: &Request, _args: &[String]) -> Response {
    Response::html(StatusCode::OK, templates::paste_new())
}

pub fn paste_create(ctx: &AppContext, request: &Request, _args: &[String]) -> Response {
    respond(create(ctx, request), Mime::Html)
}

fn create(ctx: &AppContext, request: &Request) -> Result<Response, AppError> {
    let duration = text_field(request, "duration").unwrap_or_else(|| DEFAULT_DURATION.to_string());
    let lifetime = Lifetime::named(&duration, now_seconds())?;
    let paste = CreatePasteRequest {
        title: text_field(request, "title"),
        author: text_field(request, "author"),
        filename: text_field(request, "filename"),
        language: text_field(request, "language"),
        code: request.text("code").unwrap_or_default().to_string(),
        start: None,
        end: None,
        visible: checkbox(request, "visible"),
    }
    .into_paste_with(lifetime)?;

    store(ctx, &paste)?;
    Ok(Response::redirect(&format!("/paste/{}", paste.id)))
}

pub fn paste_show(ctx: &AppContext, request: &Request, args: &[String]) -> Response {
    let result = id_arg(args).and_then(|id| {
        let now = now_seconds();
        let paste = load(ctx, &id, now)?;
        Ok(Response::html(StatusCode::OK, templates::paste_show(&paste, now)))
    });
    respond(result, request.mime())
}

pub fn paste_download(ctx: &AppContext, request: &Request, args: &[String]) -> Response {
    let result = id_arg(args).and_then(|id| {
        let paste = load(ctx, &id, now_seconds())?;
        Ok(Response::download(&paste.filename, paste.code.into_bytes()))
    });
    respond(result, request.mime())
}
