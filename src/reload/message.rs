//! Live-reload message protocol.
//!
//! JSON over WebSocket, tagged by `type`:
//!
//! ```json
//! {"type":"connected","version":"0.1.0"}
//! {"type":"reload"}
//! ```

use serde::{Deserialize, Serialize};

/// Message sent from the dev server to browser clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Sent once after the handshake
    Connected { version: String },
    /// Reload the page
    Reload,
}

impl ReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}
