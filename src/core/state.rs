//! Process-wide shutdown state for the long-running tasks.
//!
//! `watch` and `sync` block until Ctrl+C. Each one subscribes a shutdown
//! channel, and `sync` additionally registers its HTTP server so the
//! handler can unblock `recv()`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;
use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP servers to unblock on shutdown
static SERVERS: Mutex<Vec<Arc<Server>>> = Mutex::new(Vec::new());

/// Shutdown subscribers (one per long-running task)
static SUBSCRIBERS: Mutex<Vec<Sender<()>>> = Mutex::new(Vec::new());

// =============================================================================
// SHUTDOWN state
// =============================================================================

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Nothing subscribed (a plain build): exit immediately
/// - Otherwise: graceful shutdown (notify subscribers, unblock servers)
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        let subscribers = SUBSCRIBERS.lock();
        let servers = SERVERS.lock();
        if subscribers.is_empty() && servers.is_empty() {
            std::process::exit(130);
        }

        crate::log!("task"; "shutting down...");
        for tx in subscribers.iter() {
            let _ = tx.send(());
        }
        for server in servers.iter() {
            server.unblock();
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Subscribe to the shutdown signal.
///
/// The receiver yields once when Ctrl+C is pressed.
pub fn subscribe_shutdown() -> Receiver<()> {
    let (tx, rx) = bounded(1);
    if is_shutdown() {
        let _ = tx.send(());
    }
    SUBSCRIBERS.lock().push(tx);
    rx
}

/// Register an HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop
pub fn register_server(server: Arc<Server>) {
    SERVERS.lock().push(server);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_before_shutdown_is_silent() {
        let rx = subscribe_shutdown();
        assert!(rx.try_recv().is_err());
    }
}
