//! `[browsersync]` section: dev server and live reload.
//!
//! ```toml
//! [browsersync]
//! base_dir = "./dist/"
//! interface = "127.0.0.1"    # 0.0.0.0 to expose on LAN
//! port = 4000
//! ws_port = 35729            # live-reload websocket
//! notify = false             # show a badge in the page before reloading
//! watch = ["./src/**/*.html"]
//! ```

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowsersyncConfig {
    pub base_dir: PathBuf,
    pub interface: IpAddr,
    pub port: u16,
    pub ws_port: u16,
    pub notify: bool,
    /// Globs whose changes reload connected browsers.
    pub watch: Vec<String>,
}

impl Default for BrowsersyncConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./dist/"),
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 4000,
            ws_port: 35729,
            notify: false,
            watch: vec![
                "./src/**/*.html".into(),
                "./src/assets/styles/sass/**/*.{scss,sass}".into(),
                "./src/assets/scripts/js/**/*.js".into(),
            ],
        }
    }
}

impl BrowsersyncConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error("browsersync.port", "must not be 0");
        }
        if self.ws_port == 0 {
            diag.error("browsersync.ws_port", "must not be 0");
        }
        if self.port == self.ws_port {
            diag.error("browsersync.ws_port", "must differ from browsersync.port");
        }
        super::validate_globs("browsersync.watch", &self.watch, diag);
    }
}
