//! `[project]` and `[autoprefixer]` sections.
//!
//! ```toml
//! [project]
//! dir = "../_package/"     # archive root for `moveDist` (`~` expanded)
//! name = "project-name"
//! version = "v1.0.0"
//!
//! [autoprefixer]
//! browsers = ["last 8 versions"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ConfigDiagnostics;

/// Versioned archive location used by `moveDist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub dir: PathBuf,
    pub name: String,
    pub version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./../_package/"),
            name: "project-name".into(),
            version: "v1.0.0".into(),
        }
    }
}

impl ProjectConfig {
    /// `<dir>/<name>/<version>`
    pub fn archive_dir(&self) -> PathBuf {
        self.dir.join(&self.name).join(&self.version)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, value) in [("project.name", &self.name), ("project.version", &self.version)] {
            if value.trim().is_empty() {
                diag.error(field, "must not be empty");
            } else if value.contains(['/', '\\']) || value == ".." {
                diag.error(field, "must be a single path component");
            }
        }
    }
}

/// Vendor-prefix targets, as browserslist queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoprefixerConfig {
    pub browsers: Vec<String>,
}

impl Default for AutoprefixerConfig {
    fn default() -> Self {
        Self {
            browsers: vec!["last 8 versions".into()],
        }
    }
}

impl AutoprefixerConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if let Err(e) = lightningcss::targets::Browsers::from_browserslist(&self.browsers) {
            diag.error("autoprefixer.browsers", format!("invalid browserslist query: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_archive_dir() {
        let config = test_parse_config(
            "[project]\ndir = \"/srv/archive\"\nname = \"site\"\nversion = \"v2.1.0\"",
        );
        assert_eq!(
            config.project.archive_dir(),
            PathBuf::from("/srv/archive/site/v2.1.0")
        );
    }

    #[test]
    fn test_project_name_must_be_component() {
        let project = ProjectConfig {
            name: "a/b".into(),
            ..ProjectConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        project.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
    }

    #[test]
    fn test_default_browsers_are_valid() {
        let mut diag = ConfigDiagnostics::new();
        AutoprefixerConfig::default().validate(&mut diag);
        assert!(diag.is_empty());
    }
}
