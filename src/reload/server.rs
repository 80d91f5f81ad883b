//! WebSocket acceptor for live reload.
//!
//! Accepted streams are handed to the [`WsActor`](super::actor::WsActor)
//! for the handshake.

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use super::actor::WsMsg;
use crate::core::is_shutdown;
use crate::{debug, log};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the WebSocket port and start accepting clients on a thread.
///
/// Returns the port actually bound, which may be above `base_port`.
pub fn start_ws_server(
    interface: IpAddr,
    base_port: u16,
    ws_tx: mpsc::Sender<WsMsg>,
) -> Result<(u16, JoinHandle<()>)> {
    let (listener, port) = try_bind_port(interface, base_port)?;
    listener.set_nonblocking(true)?;
    if port != base_port {
        log!("reload"; "port {} in use, using {} instead", base_port, port);
    }

    let handle = thread::spawn(move || {
        while !is_shutdown() && !ws_tx.is_closed() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    debug!("reload"; "client connected: {}", addr);
                    let _ = stream.set_nonblocking(false);
                    if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    log!("reload"; "accept error: {}", e);
                    thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok((port, handle))
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind WebSocket server after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_taken_port_is_skipped() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let taken = TcpListener::bind(SocketAddr::new(localhost, 0)).unwrap();
        let port = taken.local_addr().unwrap().port();

        match try_bind_port(localhost, port) {
            Ok((_, bound)) => assert!(bound > port && bound < port.saturating_add(MAX_PORT_RETRIES)),
            // all neighbours taken
            Err(e) => assert!(e.to_string().contains("Failed to bind")),
        }
    }
}
