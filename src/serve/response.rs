//! HTTP response handlers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{livereload_js, livereload_tag};

const HTML: &str = "text/html; charset=utf-8";
const PLAIN: &str = "text/plain; charset=utf-8";
const JAVASCRIPT: &str = "text/javascript; charset=utf-8";

/// Live-reload settings every HTML response is rendered with.
#[derive(Debug, Clone, Copy)]
pub struct Livereload {
    pub ws_port: u16,
    pub notify: bool,
}

/// Respond with a file from disk, injecting the live-reload tag into HTML.
pub fn respond_file(request: Request, path: &Path, status: u16) -> Result<()> {
    let content_type = content_type(path);
    if is_head_request(&request) {
        return send_head(request, status, content_type);
    }
    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_livereload(body, content_type);
    send_body(request, status, content_type, body)
}

/// 404 with `404.html` from the base dir when present.
pub fn respond_not_found(request: Request, base_dir: &Path) -> Result<()> {
    let custom = base_dir.join("404.html");
    if custom.is_file() {
        return respond_file(request, &custom, 404);
    }
    if is_head_request(&request) {
        return send_head(request, 404, PLAIN);
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// 503 while shutting down.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

pub fn respond_livereload_js(request: Request, livereload: Livereload) -> Result<()> {
    let body = livereload_js(livereload.ws_port, livereload.notify);
    send_body(request, 200, JAVASCRIPT, body.into_bytes())
}

/// Content-Type for the asset kinds the pipeline writes.
fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => HTML,
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => JAVASCRIPT,
        Some("json" | "map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("txt") => PLAIN,
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",
        _ => "application/octet-stream",
    }
}

/// Inject the live-reload tag when `content_type` is HTML.
pub fn maybe_inject_livereload(body: Vec<u8>, content_type: &str) -> Vec<u8> {
    if content_type.starts_with("text/html") {
        inject_before_body_end(&body, livereload_tag().as_bytes())
    } else {
        body
    }
}

/// Insert `tag` before the last `</body>` (any case), or append it.
fn inject_before_body_end(content: &[u8], tag: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut out = Vec::with_capacity(content.len() + tag.len());
    out.extend_from_slice(&content[..pos]);
    out.extend_from_slice(tag);
    out.extend_from_slice(&content[pos..]);
    out
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status)).with_header(content_type_header(content_type)?);
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(content_type_header(content_type)?)
        .with_header(no_cache_header()?);
    request.respond(response)?;
    Ok(())
}

fn content_type_header(value: &str) -> Result<Header> {
    Header::from_bytes("Content-Type", value).map_err(|()| anyhow::anyhow!("invalid header value: {value}"))
}

fn no_cache_header() -> Result<Header> {
    Header::from_bytes("Cache-Control", "no-cache").map_err(|()| anyhow::anyhow!("invalid Cache-Control header"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = r#"<script src="/__sluice/livereload.js" defer></script>"#;

    #[test]
    fn test_inject_before_last_body_end() {
        let html = b"<html><body><p>x</p></BODY></html>".to_vec();
        let out = String::from_utf8(maybe_inject_livereload(html, HTML)).unwrap();
        assert_eq!(out, format!("<html><body><p>x</p>{TAG}</BODY></html>"));
    }

    #[test]
    fn test_inject_appends_without_body() {
        let out = String::from_utf8(maybe_inject_livereload(b"<p>x</p>".to_vec(), HTML)).unwrap();
        assert_eq!(out, format!("<p>x</p>{TAG}"));
    }

    #[test]
    fn test_non_html_untouched() {
        let css = b"body{}</body>".to_vec();
        assert_eq!(maybe_inject_livereload(css.clone(), "text/css; charset=utf-8"), css);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("index.html")), HTML);
        assert_eq!(content_type(Path::new("main.min.js")), JAVASCRIPT);
        assert_eq!(content_type(Path::new("main.min.js.map")), "application/json");
        assert_eq!(content_type(Path::new("fa-solid-900.woff2")), "font/woff2");
        assert_eq!(content_type(Path::new("LICENSE")), "application/octet-stream");
    }
}
