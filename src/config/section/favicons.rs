//! `[favicons]` section.
//!
//! ```toml
//! [favicons]
//! src = ["./src/favicons/*.{jpg,jpeg,png,gif}"]
//! dest = "./dist/favicons/"
//! app_name = "project-name"
//!
//! [favicons.icons]
//! apple_icon = true
//! favicons = true
//! android = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::SourceSet;
use crate::config::ConfigDiagnostics;

/// Platforms to generate icons for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsConfig {
    pub apple_icon: bool,
    pub favicons: bool,
    pub online: bool,
    pub apple_startup: bool,
    pub android: bool,
    pub firefox: bool,
    pub yandex: bool,
    pub windows: bool,
    pub coast: bool,
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            apple_icon: true,
            favicons: true,
            online: false,
            apple_startup: false,
            android: true,
            firefox: false,
            yandex: false,
            windows: false,
            coast: false,
        }
    }
}

impl IconsConfig {
    /// Enabled platforms that have no generator.
    pub fn unsupported(&self) -> Vec<&'static str> {
        [
            ("online", self.online),
            ("apple_startup", self.apple_startup),
            ("firefox", self.firefox),
            ("yandex", self.yandex),
            ("windows", self.windows),
            ("coast", self.coast),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaviconsConfig {
    pub src: Vec<String>,
    pub dest: PathBuf,
    pub icons: IconsConfig,
    /// Name written into `manifest.json`.
    pub app_name: String,
    pub background: String,
    pub theme_color: String,
    /// URL prefix used in the generated `<link>` tags and manifest.
    pub path: String,
}

impl Default for FaviconsConfig {
    fn default() -> Self {
        Self {
            src: vec!["./src/favicons/*.{jpg,jpeg,png,gif}".into()],
            dest: PathBuf::from("./dist/favicons/"),
            icons: IconsConfig::default(),
            app_name: String::new(),
            background: "#fff".into(),
            theme_color: "#fff".into(),
            path: "/favicons/".into(),
        }
    }
}

impl FaviconsConfig {
    pub fn sources(&self) -> SourceSet<'_> {
        SourceSet {
            field: "favicons",
            src: &self.src,
            dest: &self.dest,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.sources().validate(diag);
        for (field, value) in [
            ("favicons.background", &self.background),
            ("favicons.theme_color", &self.theme_color),
        ] {
            if let Err(e) = crate::transform::favicon::parse_hex_color(value) {
                diag.error(field, e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_icons_defaults() {
        let config = test_parse_config("");
        let icons = &config.favicons.icons;
        assert!(icons.apple_icon && icons.favicons && icons.android);
        assert!(icons.unsupported().is_empty());
    }

    #[test]
    fn test_unsupported_platforms_listed() {
        let config = test_parse_config("[favicons.icons]\nwindows = true\nyandex = true");
        assert_eq!(config.favicons.icons.unsupported(), vec!["yandex", "windows"]);

        let mut diag = ConfigDiagnostics::new();
        config.favicons.validate(&mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_bad_colour_rejected() {
        let config = test_parse_config("[favicons]\nbackground = \"white\"");
        let mut diag = ConfigDiagnostics::new();
        config.favicons.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, "favicons.background");
    }
}
