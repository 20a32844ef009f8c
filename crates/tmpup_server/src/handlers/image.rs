//! Image pages: upload form, display and download.

use super::{checkbox, id_arg, respond, text_field};
use crate::request::Request;
use crate::response::{Mime, Response};
use crate::templates;
use crate::AppContext;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use tmpup_core::constants::DEFAULT_DURATION;
use tmpup_core::db::time_util::now_seconds;
use tmpup_core::db::ImageDb;
use tmpup_core::models::{CreateImageRequest, Image, Lifetime};
use tmpup_core::{AppError, OpenMode};
use tracing::info;

pub(crate) fn load(ctx: &AppContext, id: &str, now: DateTime<Utc>) -> Result<Image, AppError> {
    let mut conn = ctx.open(OpenMode::ReadOnly)?;
    ImageDb
        .get(id, &mut conn)?
        .filter(|image| !image.is_expired_at(now))
        .ok_or(AppError::NotFound)
}

pub(crate) fn store(ctx: &AppContext, image: &Image) -> Result<(), AppError> {
    let mut conn = ctx.open(OpenMode::ReadWrite)?;
    ImageDb.save(image, &mut conn)?;
    info!(id = %image.id, bytes = image.data.len(), "created image");
    Ok(())
}

pub fn image_new(_ctx: &AppContext, _request: &Request, _args: &[String]) -> Response {
    Response::html(StatusCode::OK, templates::image_new())
}

pub fn image_create(ctx: &AppContext, request: &Request, _args: &[String]) -> Response {
    respond(create(ctx, request), Mime::Html)
}

fn create(ctx: &AppContext, request: &Request) -> Result<Response, AppError> {
    let file = request
        .field("file")
        .filter(|file| !file.value.is_empty())
        .ok_or_else(|| AppError::invalid("no file uploaded"))?;
    let duration = text_field(request, "duration").unwrap_or_else(|| DEFAULT_DURATION.to_string());
    let lifetime = Lifetime::named(&duration, now_seconds())?;

    let image = CreateImageRequest {
        title: text_field(request, "title"),
        author: text_field(request, "author"),
        filename: text_field(request, "filename").or_else(|| file.filename.clone()),
        data: file.value.clone(),
        start: None,
        end: None,
        visible: checkbox(request, "visible"),
    }
    .into_image_with(lifetime)?;

    store(ctx, &image)?;
    Ok(Response::redirect(&format!("/image/{}", image.id)))
}

pub fn image_show(ctx: &AppContext, request: &Request, args: &[String]) -> Response {
    let result = id_arg(args).and_then(|id| {
        let now = now_seconds();
        let image = load(ctx, &id, now)?;
        Ok(Response::html(StatusCode::OK, templates::image_show(&image, now)))
    });
    respond(result, request.mime())
}

pub fn image_download(ctx: &AppContext, request: &Request, args: &[String]) -> Response {
    let result = id_arg(args).and_then(|id| {
        let image = load(ctx, &id, now_seconds())?;
        Ok(Response::download(&image.filename, image.data))
    });
    respond(result, request.mime())
}
