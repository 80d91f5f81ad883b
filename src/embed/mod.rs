//! Resources compiled into the binary.
//!
//! Only the dev server needs any: the live-reload client served by `sync`.

pub mod serve {
    /// URL the dev server answers with the live-reload client.
    pub const LIVERELOAD_URL: &str = "/__sluice/livereload.js";

    const LIVERELOAD_JS: &str = include_str!("serve/livereload.js");

    /// Render the live-reload client for a WebSocket on `ws_port`.
    ///
    /// With `notify`, the page shows a badge before reloading.
    pub fn livereload_js(ws_port: u16, notify: bool) -> String {
        LIVERELOAD_JS
            .replace("__SLUICE_WS_PORT__", &ws_port.to_string())
            .replace("__SLUICE_NOTIFY__", if notify { "true" } else { "false" })
    }

    /// `<script>` tag injected into served HTML.
    pub fn livereload_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_URL}" defer></script>"#)
    }
}
