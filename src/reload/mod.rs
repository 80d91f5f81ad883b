//! Live reload for `sync`.
//!
//! ```text
//! notify thread (browsersync.watch) --[Reload]--> WsActor (tokio) --> Browser
//! acceptor thread (ws_port) -------[AddClient]--^
//! ```
//!
//! # Modules
//!
//! - `actor` - Client registry and broadcast
//! - `message` - JSON wire messages
//! - `server` - WebSocket acceptor

mod actor;
mod message;
mod server;

use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::glob::Globs;
use crate::utils::path::to_slash;
use crate::watch::watch_paths;
use crate::{debug, log};
use actor::{WsActor, WsMsg};

/// Running live-reload side: WebSocket server, actor and watcher.
pub struct LiveReload {
    port: u16,
    tx: mpsc::Sender<WsMsg>,
    threads: Vec<JoinHandle<()>>,
}

impl LiveReload {
    /// Bind the WebSocket port and start watching `browsersync.watch`.
    pub fn start(config: &Config) -> Result<Self> {
        let sync = &config.browsersync;
        let (tx, rx) = mpsc::channel::<WsMsg>(64);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("Failed to create live-reload runtime")?;
        let actor = thread::spawn(move || runtime.block_on(WsActor::new(rx).run()));

        let (port, acceptor) = server::start_ws_server(sync.interface, sync.ws_port, tx.clone())?;
        debug!("reload"; "ws://{}:{}", sync.interface, port);

        let globs = Globs::new(config.get_root(), &sync.watch)?;
        let roots = globs.watch_roots();
        let watch_tx = tx.clone();
        let watcher = thread::spawn(move || {
            let result = watch_paths("reload", &roots, |changes| {
                let Some((path, kind)) = changes.iter().find(|(path, _)| globs.is_match(path)) else {
                    return;
                };
                let reason = format!("{} {}", to_slash(path), kind.label());
                let _ = watch_tx.blocking_send(WsMsg::Reload { reason });
            });
            if let Err(e) = result {
                log!("reload"; "watcher stopped: {:#}", e);
            }
        });

        Ok(Self {
            port,
            tx,
            threads: vec![actor, acceptor, watcher],
        })
    }

    /// Port the WebSocket server actually bound.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stop the actor and wait briefly for the threads to finish.
    pub fn shutdown(self) {
        let _ = self.tx.blocking_send(WsMsg::Shutdown);
        drop(self.tx);
        for _ in 0..40 {
            if self.threads.iter().all(JoinHandle::is_finished) {
                break;
            }
            thread::sleep(Duration::from_millis(50));
        }
        for handle in self.threads {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}
