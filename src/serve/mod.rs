//! `sync`: development server with live reload.
//!
//! Serves `browsersync.base_dir` over HTTP and pushes reloads over a
//! WebSocket (see [`crate::reload`]). Blocks until Ctrl+C.

mod path;
mod response;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Request, Server};

use crate::core::{is_shutdown, register_server};
use crate::embed::serve::LIVERELOAD_URL;
use crate::graph::TaskContext;
use crate::reload::LiveReload;
use crate::{debug, log};
use response::Livereload;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Per-request state shared by the worker pool.
#[derive(Debug)]
struct ServeState {
    base_dir: PathBuf,
    livereload: Livereload,
}

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let sync = &config.browsersync;

    let (server, addr) = bind_with_retry(sync.interface, sync.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));
    if is_shutdown() {
        server.unblock();
    }

    let live = LiveReload::start(config)?;
    let state = Arc::new(ServeState {
        base_dir: config.root_join(&sync.base_dir),
        livereload: Livereload {
            ws_port: live.port(),
            notify: sync.notify,
        },
    });

    log!("serve"; "http://{}", addr);
    debug!("serve"; "serving {}", state.base_dir.display());

    let result = run_request_loop(&server, &state);
    live.shutdown();
    result
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = String::new();
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error
    ))
}

/// Handle requests on a small pool until the server is unblocked.
fn run_request_loop(server: &Server, state: &Arc<ServeState>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("Failed to create request pool")?;

    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }
    Ok(())
}

fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url = request.url().to_string();
    debug!("serve"; "{} {}", request.method(), url);

    if url.split('?').next() == Some(LIVERELOAD_URL) {
        return response::respond_livereload_js(request, state.livereload);
    }

    match path::resolve_path(&url, &state.base_dir) {
        Some(file) => response::respond_file(request, &file, 200),
        None => response::respond_not_found(request, &state.base_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fs::write_file;
    use std::io::{Read, Write};
    use std::net::{Ipv4Addr, TcpListener, TcpStream};
    use std::path::Path;
    use std::thread;
    use tempfile::TempDir;

    /// Serve `base_dir` on an ephemeral port for one request.
    fn get(base_dir: &Path, url: &str) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let state = ServeState {
            base_dir: base_dir.to_path_buf(),
            livereload: Livereload {
                ws_port: 35729,
                notify: false,
            },
        };

        let url = url.to_string();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            write!(stream, "GET {url} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
            let mut out = String::new();
            stream.read_to_string(&mut out).unwrap();
            out
        });

        let request = server.recv().unwrap();
        handle_request(request, &state).unwrap();
        client.join().unwrap()
    }

    #[test]
    fn test_html_gets_livereload_tag() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("index.html"), b"<html><body>hi</body></html>").unwrap();

        let response = get(dir.path(), "/");
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(r#"hi<script src="/__sluice/livereload.js" defer></script></body>"#));
    }

    #[test]
    fn test_livereload_script_served() {
        let dir = TempDir::new().unwrap();
        let response = get(dir.path(), LIVERELOAD_URL);
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("var port = 35729;"));
    }

    #[test]
    fn test_custom_not_found() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("404.html"), b"<body>lost</body>").unwrap();

        let response = get(dir.path(), "/missing.html");
        assert!(response.starts_with("HTTP/1.1 404"));
        assert!(response.contains("lost"));
    }

    #[test]
    fn test_plain_not_found() {
        let dir = TempDir::new().unwrap();
        let response = get(dir.path(), "/missing.css");
        assert!(response.starts_with("HTTP/1.1 404"));
        assert!(response.ends_with("404 Not Found"));
    }

    #[test]
    fn test_bind_retry_skips_taken_port() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let taken = TcpListener::bind((localhost, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();
        if let Ok((_, addr)) = bind_with_retry(localhost, port) {
            assert_ne!(addr.port(), port);
        }
    }
}
