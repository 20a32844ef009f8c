//! Unit tests for the `tmpup` client.

use super::{
    api_url, created_id, error_message_for_response, file_name, image_body, metadata,
    normalize_host, paste_body, resolve_host, upload,
};
use super::{Cli, Commands};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde_json::json;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tmpup_core::{DEFAULT_CLI_HOST, DEFAULT_PORT};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("timestamp")
}

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["tmpup"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("parse")
}

/// Answers a single HTTP request with a canned response and hands back the
/// raw request text.
fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let host = format!("http://{}", listener.local_addr().expect("listener addr"));
    let worker = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout");
        let mut raw = Vec::new();
        let mut chunk = [0_u8; 4096];
        while !request_complete(&raw) {
            let read = stream.read(&mut chunk).expect("read request");
            if read == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..read]);
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).expect("write response");
        String::from_utf8_lossy(&raw).into_owned()
    });
    (host, worker)
}

fn request_complete(raw: &[u8]) -> bool {
    let Some(split) = raw.windows(4).position(|window| window == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&raw[..split]);
    let length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    raw.len() >= split + 4 + length
}

fn local_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("client")
}

#[test]
fn default_cli_host_uses_default_port_constant() {
    assert_eq!(DEFAULT_CLI_HOST, format!("http://localhost:{}", DEFAULT_PORT));
}

#[test]
fn short_flags_precede_the_command() {
    let cli = parse(&[
        "-a", "alice", "-t", "notes", "-f", "notes.rs", "-l", "rust", "-e", "week", "-h",
        "http://paste.example:9000/", "-v", "paste", "notes.rs",
    ]);
    assert_eq!(cli.author.as_deref(), Some("alice"));
    assert_eq!(cli.title.as_deref(), Some("notes"));
    assert_eq!(cli.filename.as_deref(), Some("notes.rs"));
    assert_eq!(cli.language.as_deref(), Some("rust"));
    assert_eq!(cli.expires, "week");
    assert_eq!(cli.host.as_deref(), Some("http://paste.example:9000/"));
    assert!(cli.verbose);
    match cli.command {
        Commands::Paste { file } => assert_eq!(file.as_deref(), Some(Path::new("notes.rs"))),
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn long_help_survives_host_taking_short_h() {
    let err = Cli::try_parse_from(["tmpup", "--help"]).expect_err("help");
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    assert!(Cli::try_parse_from(["tmpup", "upload"]).is_err());
}

#[test]
fn metadata_defaults_to_one_hour_and_validates_choices() {
    let meta = metadata(&parse(&["paste"]), at(1_000)).expect("defaults");
    assert_eq!(meta.lifetime.start, at(1_000));
    assert_eq!(meta.lifetime.end, at(4_600));
    assert!(meta.language.is_none());

    let upper = metadata(&parse(&["-l", "Rust", "paste"]), at(0)).expect("language");
    assert_eq!(upper.language.as_deref(), Some("rust"));

    let err = metadata(&parse(&["-l", "klingon", "paste"]), at(0)).expect_err("language");
    assert_eq!(err, "invalid language 'klingon'");
    let err = metadata(&parse(&["-e", "forever", "paste"]), at(0)).expect_err("duration");
    assert_eq!(err, "invalid duration 'forever'");
}

#[test]
fn paste_body_carries_only_supplied_fields() {
    let meta = metadata(&parse(&["-t", "hello", "-l", "c", "-e", "day", "paste"]), at(10))
        .expect("meta");
    let body = paste_body(&meta, b"int main;".to_vec()).expect("body");
    assert_eq!(
        body,
        json!({
            "title": "hello",
            "language": "c",
            "code": "int main;",
            "start": 10,
            "end": 86_410
        })
    );
    assert_eq!(
        paste_body(&meta, vec![0xff, 0xfe]).expect_err("binary"),
        "input is not valid UTF-8"
    );
}

#[test]
fn image_body_encodes_recognized_images_only() {
    let meta = metadata(&parse(&["-f", "dot.png", "image"]), at(0)).expect("meta");
    let body = image_body(&meta, PNG).expect("png");
    assert_eq!(body["filename"], "dot.png");
    assert_eq!(body["data"], "iVBORw0KGgoAAAANSUhEUg==");
    assert!(body.get("language").is_none());
    assert_eq!(
        image_body(&meta, b"just text").expect_err("text"),
        "not a valid image"
    );
    assert_eq!(
        file_name(Some(Path::new("/tmp/shots/cat.gif"))).as_deref(),
        Some("cat.gif")
    );
}

#[test]
fn hosts_are_trimmed_and_urls_built_from_segments() {
    assert_eq!(normalize_host(" http://box:8090// "), "http://box:8090");
    assert_eq!(resolve_host(None), DEFAULT_CLI_HOST);
    assert_eq!(resolve_host(Some("  ")), DEFAULT_CLI_HOST);
    assert_eq!(resolve_host(Some("https://tmp.example/")), "https://tmp.example");

    let cases = [
        ("http://127.0.0.1:8090", "http://127.0.0.1:8090/api/v0/paste"),
        ("http://127.0.0.1:8090/", "http://127.0.0.1:8090/api/v0/paste"),
        ("https://tmp.example/up", "https://tmp.example/up/api/v0/paste"),
    ];
    for (host, expected) in cases {
        let url = api_url(host, &["api", "v0", "paste"]).expect("url");
        assert_eq!(url.as_str(), expected);
    }
    assert!(api_url("not a url", &["api"]).is_err());
    assert!(api_url("mailto:someone@example.com", &["api"]).is_err());
}

#[test]
fn error_message_prefers_json_error_field() {
    let status = reqwest::StatusCode::BAD_REQUEST;
    assert_eq!(
        error_message_for_response(status, r#"{"error":"too long duration"}"#),
        "HTTP 400: too long duration"
    );
    assert_eq!(
        error_message_for_response(status, "gateway says no\n"),
        "HTTP 400: gateway says no"
    );
    assert_eq!(
        error_message_for_response(reqwest::StatusCode::BAD_GATEWAY, "  "),
        "HTTP 502"
    );
}

#[test]
fn created_id_requires_a_well_formed_identifier() {
    assert_eq!(created_id(&json!({ "id": "abcd1234" })).expect("id"), "abcd1234");
    assert_eq!(
        created_id(&json!({ "status": "Created" })).expect_err("missing"),
        "response missing 'id' field"
    );
    assert!(created_id(&json!({ "id": "../etc" })).is_err());
}

#[tokio::test]
async fn upload_posts_json_and_returns_the_new_id() {
    let (host, server) = serve_once("201 Created", r#"{"id":"k3y9a0b1"}"#);
    let url = api_url(&host, &["api", "v0", "paste"]).expect("url");

    let id = upload(&local_client(), url, &json!({ "code": "hi" }), false)
        .await
        .expect("upload");
    assert_eq!(id, "k3y9a0b1");

    let request = server.join().expect("server thread");
    assert!(request.starts_with("POST /api/v0/paste HTTP/1.1\r\n"), "{}", request);
    assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(request.ends_with(r#"{"code":"hi"}"#), "{}", request);
}

#[tokio::test]
async fn upload_surfaces_server_validation_errors() {
    let (host, server) = serve_once("400 Bad Request", r#"{"error":"invalid language 'x'"}"#);
    let url = api_url(&host, &["api", "v0", "image"]).expect("url");

    let err = upload(&local_client(), url, &json!({ "data": "" }), false)
        .await
        .expect_err("rejected");
    assert_eq!(err, "HTTP 400: invalid language 'x'");
    server.join().expect("server thread");
}
