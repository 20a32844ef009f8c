//! JSON API: `/api/v0/paste` and `/api/v0/image`.
//!
//! Creation takes the JSON body as the single `json` field and answers
//! `201 {"id": …}`; lookups answer the stored record.

use super::{id_arg, image, paste, respond};
use crate::request::Request;
use crate::response::{Mime, Response};
use crate::AppContext;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use tmpup_core::db::time_util::now_seconds;
use tmpup_core::models::{CreateImageRequest, CreatePasteRequest};
use tmpup_core::AppError;

fn parse_body<T: DeserializeOwned>(request: &Request) -> Result<T, AppError> {
    let text = request
        .text("json")
        .ok_or_else(|| AppError::invalid("invalid input"))?;
    serde_json::from_str(text).map_err(|err| AppError::invalid(format!("invalid input: {}", err)))
}

pub fn api_paste_create(ctx: &AppContext, request: &Request, _args: &[String]) -> Response {
    let result = parse_body::<CreatePasteRequest>(request).and_then(|body| {
        let paste = body.into_paste(now_seconds())?;
        paste::store(ctx, &paste)?;
        Ok(Response::json(StatusCode::CREATED, json!({ "id": paste.id })))
    });
    respond(result, Mime::Json)
}

pub fn api_paste_show(ctx: &AppContext, _request: &Request, args: &[String]) -> Response {
    let result = id_arg(args).and_then(|id| {
        let paste = paste::load(ctx, &id, now_seconds())?;
        Ok(Response::json_of(StatusCode::OK, &paste))
    });
    respond(result, Mime::Json)
}

pub fn api_image_create(ctx: &AppContext, request: &Request, _args: &[String]) -> Response {
    let result = parse_body::<CreateImageRequest>(request).and_then(|body| {
        let image = body.into_image(now_seconds())?;
        image::store(ctx, &image)?;
        Ok(Response::json(StatusCode::CREATED, json!({ "id": image.id })))
    });
    respond(result, Mime::Json)
}

pub fn api_image_show(ctx: &AppContext, _request: &Request, args: &[String]) -> Response {
    let result = id_arg(args).and_then(|id| {
        let image = image::load(ctx, &id, now_seconds())?;
        Ok(Response::json_of(StatusCode::OK, &image))
    });
    respond(result, Mime::Json)
}
