use super::*;
use crate::error::AppError;
use crate::constants::{DEFAULT_LANGUAGE, DURATION_HOUR};
use crate::naming::is_valid_id;
use chrono::{DateTime, Utc};

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("timestamp")
}

#[test]
fn normalize_optional_drops_blank_values() {
    assert_eq!(normalize_optional(None), None);
    assert_eq!(normalize_optional(Some("   ")), None);
    assert_eq!(normalize_optional(Some(" x ")), Some("x".to_string()));
}

#[test]
fn paste_request_fills_defaults() {
    let request = CreatePasteRequest {
        code: "fn main() {}".into(),
        title: Some("  ".into()),
        ..Default::default()
    };
    let paste = request.into_paste(at(1_000)).expect("paste");

    assert!(is_valid_id(&paste.id));
    assert_eq!(paste.title, "void");
    assert_eq!(paste.author, "anon");
    assert_eq!(paste.filename, "box");
    assert_eq!(paste.language, DEFAULT_LANGUAGE);
    assert_eq!(paste.created_at, at(1_000));
    assert_eq!(paste.expires_at, at(1_000 + DURATION_HOUR));
    assert!(!paste.visible);
}

#[test]
fn paste_request_rejects_unknown_language_and_empty_code() {
    let bad_language = CreatePasteRequest {
        code: "x".into(),
        language: Some("klingon".into()),
        ..Default::default()
    };
    let err = bad_language.into_paste(at(0)).expect_err("language");
    assert_eq!(err.to_string(), "invalid language 'klingon'");

    let empty = CreatePasteRequest {
        code: " \n".into(),
        ..Default::default()
    };
    assert!(matches!(
        empty.into_paste(at(0)),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn paste_json_uses_start_end_epoch_keys() {
    let paste = CreatePasteRequest {
        code: "hello".into(),
        language: Some("Rust".into()),
        start: Some(10),
        end: Some(20),
        visible: true,
        ..Default::default()
    }
    .into_paste(at(0))
    .expect("paste");

    let value = serde_json::to_value(&paste).expect("json");
    assert_eq!(value["start"], 10);
    assert_eq!(value["end"], 20);
    assert_eq!(value["language"], "rust");
    assert_eq!(value["visible"], true);

    let back: Paste = serde_json::from_value(value).expect("decode");
    assert_eq!(back, paste);
}

#[test]
fn create_paste_request_requires_code() {
    let err = serde_json::from_str::<CreatePasteRequest>(r#"{"title":"t"}"#)
        .expect_err("missing code");
    assert!(err.to_string().contains("code"));
}

#[test]
fn image_request_decodes_base64_and_checks_magic() {
    use base64::Engine as _;
    let encoded = base64::engine::general_purpose::STANDARD.encode(PNG_HEADER);
    let body = format!(r#"{{"filename":"a.png","data":"{}"}}"#, encoded);
    let request: CreateImageRequest = serde_json::from_str(&body).expect("request");
    let image = request.into_image(at(0)).expect("image");

    assert_eq!(image.data, PNG_HEADER);
    assert_eq!(image.filename, "a.png");
    assert_eq!(image.format(), Some(ImageFormat::Png));
    assert!(image
        .data_uri()
        .expect("uri")
        .starts_with("data:image/png;base64,"));

    let value = serde_json::to_value(&image).expect("json");
    assert_eq!(value["data"], encoded);
}

#[test]
fn image_request_rejects_non_images_and_bad_base64() {
    let text = CreateImageRequest {
        data: b"just text".to_vec(),
        ..Default::default()
    };
    let err = text.into_image(at(0)).expect_err("not an image");
    assert_eq!(err.to_string(), "not a valid image");

    let err = serde_json::from_str::<CreateImageRequest>(r#"{"data":"***"}"#)
        .expect_err("bad base64");
    assert!(err.to_string().contains("invalid base64 data"));
}

#[test]
fn expiry_is_inclusive_of_now() {
    let paste = CreatePasteRequest {
        code: "x".into(),
        start: Some(0),
        end: Some(60),
        ..Default::default()
    }
    .into_paste(at(0))
    .expect("paste");
    assert!(!paste.is_expired_at(at(59)));
    assert!(paste.is_expired_at(at(60)));
}
