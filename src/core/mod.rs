//! Core process state shared across tasks.

mod state;

pub use state::{is_shutdown, register_server, setup_shutdown_handler, subscribe_shutdown};
