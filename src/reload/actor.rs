//! WebSocket actor: owns the connected clients and broadcasts reloads.
//!
//! ```text
//! acceptor thread --[AddClient]--> WsActor --[{"type":"reload"}]--> clients
//! watcher thread  --[Reload]-----^
//! ```

use std::io::ErrorKind;
use std::net::TcpStream;

use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::ReloadMessage;
use crate::{debug, log};

/// Messages handled by [`WsActor`]
#[derive(Debug)]
pub enum WsMsg {
    /// A freshly accepted TCP stream, before the WebSocket handshake
    AddClient(TcpStream),
    /// Tell every client to reload
    Reload { reason: String },
    /// Close all clients and stop
    Shutdown,
}

pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    clients: Vec<WebSocket<TcpStream>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Vec::new(),
        }
    }

    /// Run until [`WsMsg::Shutdown`] or every sender is dropped.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::AddClient(stream) => self.add_client(stream),
                WsMsg::Reload { reason } => {
                    debug!("reload"; "reloading: {}", reason);
                    self.broadcast(&ReloadMessage::Reload);
                }
                WsMsg::Shutdown => break,
            }
        }
        for mut client in self.clients.drain(..) {
            let _ = client.close(None);
            let _ = client.flush();
        }
        debug!("reload"; "stopped");
    }

    fn add_client(&mut self, stream: TcpStream) {
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                // reads are polled by prune_closed
                let _ = ws.get_ref().set_nonblocking(true);
                if let Err(e) = ws.send(Message::Text(ReloadMessage::connected().to_json().into())) {
                    debug!("reload"; "client dropped during greeting: {}", e);
                    return;
                }
                self.clients.push(ws);
                debug!("reload"; "{} client(s) connected", self.clients.len());
            }
            Err(e) => log!("reload"; "handshake failed: {}", e),
        }
    }

    /// Send `msg` to every client, dropping those that have gone away.
    fn broadcast(&mut self, msg: &ReloadMessage) {
        self.prune_closed();
        if self.clients.is_empty() {
            debug!("reload"; "no clients connected");
            return;
        }
        let text = Message::Text(msg.to_json().into());
        self.clients.retain_mut(|ws| match ws.send(text.clone()) {
            Ok(()) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        debug!("reload"; "reload sent to {} client(s)", self.clients.len());
    }

    /// Drain pending client frames; drop clients that closed.
    fn prune_closed(&mut self) {
        self.clients.retain_mut(|ws| loop {
            match ws.read() {
                Ok(Message::Close(_)) => break false,
                Ok(_) => continue,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => break true,
                Err(_) => break false,
            }
        });
    }
}
