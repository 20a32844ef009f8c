//! HTML pages rendered without a template engine.

use chrono::{DateTime, Utc};
use tmpup_core::constants::{DEFAULT_DURATION, DURATIONS};
use tmpup_core::models::check::LANGUAGES;
use tmpup_core::models::{Image, Paste};

/// HTML-escape a string to prevent XSS.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - tmpup</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header><a href="/">tmpup</a> <nav><a href="/paste/new">new paste</a> <a href="/image/new">new image</a></nav></header>
<main>
{body}
</main>
</body>
</html>"#,
        title = html_escape(title),
        body = body,
    )
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn duration_options() -> String {
    DURATIONS
        .iter()
        .map(|(name, _)| {
            let selected = if *name == DEFAULT_DURATION { " selected" } else { "" };
            format!(r#"<option value="{name}"{selected}>{name}</option>"#)
        })
        .collect()
}

fn language_options() -> String {
    LANGUAGES
        .iter()
        .map(|language| {
            let selected = if *language == "nohighlight" { " selected" } else { "" };
            format!(r#"<option value="{language}"{selected}>{language}</option>"#)
        })
        .collect()
}

/// Status page carrying `message`.
pub fn status(code: u16, message: &str) -> String {
    let body = format!(
        r#"<div class="status"><h1>{code}</h1><p>{message}</p></div>"#,
        message = html_escape(message),
    );
    page(message, &body)
}

/// Index page listing the most recent public pastes and images.
pub fn index(pastes: &[Paste], images: &[Image], now: DateTime<Utc>) -> String {
    let mut body = String::from("<h2>Recent pastes</h2>\n");
    if pastes.is_empty() {
        body.push_str(r#"<p class="empty">No pastes yet.</p>"#);
    } else {
        body.push_str("<table><tr><th>title</th><th>author</th><th>language</th><th>date</th><th>expires in</th></tr>\n");
        for paste in pastes {
            body.push_str(&format!(
                r#"<tr><td><a href="/paste/{id}">{title}</a></td><td>{author}</td><td>{language}</td><td>{date}</td><td>{left}</td></tr>"#,
                id = html_escape(&paste.id),
                title = html_escape(&paste.title),
                author = html_escape(&paste.author),
                language = html_escape(&paste.language),
                date = timestamp(paste.created_at),
                left = paste.lifetime().remaining(now),
            ));
            body.push('\n');
        }
        body.push_str("</table>\n");
    }

    body.push_str("<h2>Recent images</h2>\n");
    if images.is_empty() {
        body.push_str(r#"<p class="empty">No images yet.</p>"#);
    } else {
        body.push_str("<table><tr><th>title</th><th>author</th><th>date</th><th>expires in</th></tr>\n");
        for image in images {
            body.push_str(&format!(
                r#"<tr><td><a href="/image/{id}">{title}</a></td><td>{author}</td><td>{date}</td><td>{left}</td></tr>"#,
                id = html_escape(&image.id),
                title = html_escape(&image.title),
                author = html_escape(&image.author),
                date = timestamp(image.created_at),
                left = image.lifetime().remaining(now),
            ));
            body.push('\n');
        }
        body.push_str("</table>\n");
    }

    page("recent", &body)
}

pub fn paste_new() -> String {
    let body = format!(
        r#"<form method="post" action="/paste/new">
<input type="text" name="title" placeholder="title">
<input type="text" name="author" placeholder="author">
<input type="text" name="filename" placeholder="filename">
<select name="language">{languages}</select>
<select name="duration">{durations}</select>
<label><input type="checkbox" name="visible" checked> public</label>
<textarea name="code" required placeholder="paste your code here"></textarea>
<button type="submit">paste</button>
</form>"#,
        languages = language_options(),
        durations = duration_options(),
    );
    page("new paste", &body)
}

pub fn paste_show(paste: &Paste, now: DateTime<Utc>) -> String {
    let body = format!(
        r#"<h1>{title}</h1>
<p class="meta">by {author} &middot; {filename} &middot; {language} &middot; {date} &middot; expires in {left} &middot; <a href="/paste/download/{id}">download</a></p>
<pre><code class="language-{language}">{code}</code></pre>"#,
        id = html_escape(&paste.id),
        title = html_escape(&paste.title),
        author = html_escape(&paste.author),
        filename = html_escape(&paste.filename),
        language = html_escape(&paste.language),
        date = timestamp(paste.created_at),
        left = paste.lifetime().remaining(now),
        code = html_escape(&paste.code),
    );
    page(&paste.title, &body)
}

pub fn image_new() -> String {
    let body = format!(
        r#"<form method="post" action="/image/new" enctype="multipart/form-data">
<input type="text" name="title" placeholder="title">
<input type="text" name="author" placeholder="author">
<input type="text" name="filename" placeholder="filename">
<select name="duration">{durations}</select>
<label><input type="checkbox" name="visible" checked> public</label>
<input type="file" name="file" accept="image/*" required>
<button type="submit">upload</button>
</form>"#,
        durations = duration_options(),
    );
    page("new image", &body)
}

pub fn image_show(image: &Image, now: DateTime<Utc>) -> String {
    let preview = match image.data_uri() {
        Some(uri) => format!(
            r#"<img src="{uri}" alt="{alt}">"#,
            alt = html_escape(&image.filename)
        ),
        None => String::from(r#"<p class="empty">preview unavailable</p>"#),
    };
    let body = format!(
        r#"<h1>{title}</h1>
<p class="meta">by {author} &middot; {filename} &middot; {date} &middot; expires in {left} &middot; <a href="/image/download/{id}">download</a></p>
{preview}"#,
        id = html_escape(&image.id),
        title = html_escape(&image.title),
        author = html_escape(&image.author),
        filename = html_escape(&image.filename),
        date = timestamp(image.created_at),
        left = image.lifetime().remaining(now),
    );
    page(&image.title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escape_neutralizes_markup() {
        assert_eq!(
            html_escape(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn forms_offer_every_duration_with_default_selected() {
        let form = paste_new();
        for (name, _) in DURATIONS {
            assert!(form.contains(&format!(r#"value="{}""#, name)));
        }
        assert!(form.contains(r#"<option value="day" selected>"#));
        assert!(image_new().contains(r#"enctype="multipart/form-data""#));
        for form in [paste_new(), image_new()] {
            assert!(form.contains(r#"<input type="checkbox" name="visible" checked>"#));
        }
    }
}
