//! `[watch]` section: globs that re-run single tasks.
//!
//! `styles` and `scripts` fall back to the `[sass]` and `[scripts]`
//! source globs when unset.

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub html: Vec<String>,
    pub styles: Option<Vec<String>>,
    pub scripts: Option<Vec<String>>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            html: vec!["./src/**/*.html".into()],
            styles: None,
            scripts: None,
        }
    }
}

impl WatchConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        super::validate_globs("watch.html", &self.html, diag);
        if let Some(styles) = &self.styles {
            super::validate_globs("watch.styles", styles, diag);
        }
        if let Some(scripts) = &self.scripts {
            super::validate_globs("watch.scripts", scripts, diag);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_watch_defaults_follow_sources() {
        let config = test_parse_config("[sass]\nsrc = [\"styles/**/*.scss\"]");
        assert!(config.watch.styles.is_none());
        assert_eq!(config.watch_styles(), &["styles/**/*.scss".to_string()]);
        assert_eq!(config.watch_scripts(), config.scripts.src.as_slice());
    }

    #[test]
    fn test_watch_override() {
        let config = test_parse_config("[watch]\nstyles = [\"src/**/*.scss\"]");
        assert_eq!(config.watch_styles(), &["src/**/*.scss".to_string()]);
    }
}
