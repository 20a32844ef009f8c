//! Command-line upload client for tmpupd.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tmpup_core::db::time_util::now_seconds;
use tmpup_core::models::check::{check_image, check_language};
use tmpup_core::models::Lifetime;
use tmpup_core::naming::is_valid_id;
use tmpup_core::DEFAULT_CLI_HOST;

#[derive(Debug, Parser)]
#[command(
    name = "tmpup",
    about = "Upload pastes and images to a tmpupd server",
    version,
    disable_help_flag = true
)]
struct Cli {
    /// Server URL (can also be set via TMPUP_HOST)
    #[arg(short = 'h', long, env = "TMPUP_HOST")]
    host: Option<String>,

    #[arg(short, long)]
    author: Option<String>,

    #[arg(short, long)]
    title: Option<String>,

    #[arg(short, long)]
    filename: Option<String>,

    /// Highlight language of a paste
    #[arg(short, long)]
    language: Option<String>,

    /// Lifetime of the upload: hour, day, week or month
    #[arg(short = 'e', long = "expires", default_value = "hour")]
    expires: String,

    /// Print the request target and response status on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "3")]
    timeout: u64,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upload text read from FILE or standard input
    Paste { file: Option<PathBuf> },
    /// Upload an image read from FILE or standard input
    Image { file: Option<PathBuf> },
}

/// Fields shared by both upload kinds, validated before anything is sent.
#[derive(Debug)]
struct Metadata {
    title: Option<String>,
    author: Option<String>,
    filename: Option<String>,
    language: Option<String>,
    lifetime: Lifetime,
}

fn metadata(cli: &Cli, now: DateTime<Utc>) -> Result<Metadata, String> {
    let language = cli.language.as_deref().map(str::to_ascii_lowercase);
    if let Some(language) = &language {
        check_language(language).map_err(|err| err.to_string())?;
    }
    let lifetime = Lifetime::named(&cli.expires, now).map_err(|err| err.to_string())?;
    Ok(Metadata {
        title: cli.title.clone(),
        author: cli.author.clone(),
        filename: cli.filename.clone(),
        language,
        lifetime,
    })
}

fn base_body(meta: &Metadata) -> Map<String, Value> {
    let mut body = Map::new();
    let optional = [
        ("title", &meta.title),
        ("author", &meta.author),
        ("filename", &meta.filename),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            body.insert(key.to_string(), json!(value));
        }
    }
    body.insert("start".into(), json!(meta.lifetime.start.timestamp()));
    body.insert("end".into(), json!(meta.lifetime.end.timestamp()));
    body
}

fn paste_body(meta: &Metadata, input: Vec<u8>) -> Result<Value, String> {
    let code = String::from_utf8(input).map_err(|_| "input is not valid UTF-8".to_string())?;
    let mut body = base_body(meta);
    if let Some(language) = &meta.language {
        body.insert("language".into(), json!(language));
    }
    body.insert("code".into(), json!(code));
    Ok(Value::Object(body))
}

fn image_body(meta: &Metadata, input: &[u8]) -> Result<Value, String> {
    check_image(input).map_err(|err| err.to_string())?;
    let mut body = base_body(meta);
    body.insert("data".into(), json!(STANDARD.encode(input)));
    Ok(Value::Object(body))
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('/').to_string()
}

fn resolve_host(host: Option<&str>) -> String {
    host.map(normalize_host)
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DEFAULT_CLI_HOST.to_string())
}

fn api_url(host: &str, segments: &[&str]) -> Result<reqwest::Url, String> {
    let mut url =
        reqwest::Url::parse(host).map_err(|err| format!("invalid host '{}': {}", host, err))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| format!("host '{}' cannot be used as a base URL", host))?;
    path.pop_if_empty();
    path.extend(segments);
    drop(path);
    Ok(url)
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_string))
        .or_else(|| Some(body.trim().to_string()).filter(|body| !body.is_empty()));
    match message {
        Some(message) => format!("HTTP {}: {}", status.as_u16(), message),
        None => format!("HTTP {}", status.as_u16()),
    }
}

fn created_id(response: &Value) -> Result<String, String> {
    let id = response
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| "response missing 'id' field".to_string())?;
    if !is_valid_id(id) {
        return Err(format!("server returned a malformed id '{}'", id));
    }
    Ok(id.to_string())
}

async fn upload(
    client: &reqwest::Client,
    url: reqwest::Url,
    body: &Value,
    verbose: bool,
) -> Result<String, String> {
    if verbose {
        eprintln!("POST {}", url);
    }
    let res = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let status = res.status();
    if verbose {
        eprintln!("HTTP {}", status.as_u16());
    }

    let text = res.text().await.map_err(|err| err.to_string())?;
    if status != reqwest::StatusCode::CREATED {
        return Err(error_message_for_response(status, &text));
    }
    let response: Value =
        serde_json::from_str(&text).map_err(|err| format!("invalid response: {}", err))?;
    created_id(&response)
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>, String> {
    match file {
        Some(path) => {
            std::fs::read(path).map_err(|err| format!("{}: {}", path.display(), err))
        }
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|err| format!("stdin: {}", err))?;
            Ok(buffer)
        }
    }
}

fn file_name(file: Option<&Path>) -> Option<String> {
    file.and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
}

async fn run(cli: Cli) -> Result<String, String> {
    let host = resolve_host(cli.host.as_deref());
    let mut meta = metadata(&cli, now_seconds())?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()
        .map_err(|err| err.to_string())?;

    let (kind, body) = match &cli.command {
        Commands::Paste { file } => {
            let input = read_input(file.as_deref())?;
            ("paste", paste_body(&meta, input)?)
        }
        Commands::Image { file } => {
            let input = read_input(file.as_deref())?;
            if meta.filename.is_none() {
                meta.filename = file_name(file.as_deref());
            }
            ("image", image_body(&meta, &input)?)
        }
    };

    let url = api_url(&host, &["api", "v0", kind])?;
    let id = upload(&client, url, &body, cli.verbose).await?;
    Ok(format!("{}/{}/{}", host, kind, id))
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(link) => {
            println!("{}", link);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("abort: {}", message);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests;
