//! Landing page with the most recent public uploads.

use super::respond;
use crate::request::Request;
use crate::response::{Mime, Response};
use crate::templates;
use crate::AppContext;
use axum::http::StatusCode;
use tmpup_core::constants::RECENT_LIMIT;
use tmpup_core::db::time_util::now_seconds;
use tmpup_core::db::{ImageDb, PasteDb};
use tmpup_core::{AppError, OpenMode};

pub fn index(ctx: &AppContext, _request: &Request, _args: &[String]) -> Response {
    respond(render(ctx), Mime::Html)
}

fn render(ctx: &AppContext) -> Result<Response, AppError> {
    let now = now_seconds();
    let mut conn = ctx.open(OpenMode::ReadOnly)?;
    let pastes = PasteDb.list_recent(RECENT_LIMIT, now, &mut conn)?;
    let images = ImageDb.list_recent(RECENT_LIMIT, now, &mut conn)?;
    Ok(Response::html(
        StatusCode::OK,
        templates::index(&pastes, &images, now),
    ))
}
