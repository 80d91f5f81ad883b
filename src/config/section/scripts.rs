//! `[scripts]` section.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::SourceSet;
use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    pub src: Vec<String>,
    pub dest: PathBuf,
    /// Production bundle name.
    pub bundle: String,
    /// Append a content hash to the bundle name.
    pub hash: bool,
    /// Spaces per indent level for formatted output.
    pub indent: usize,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            src: vec!["./src/assets/scripts/js/**/*.js".into()],
            dest: PathBuf::from("./dist/assets/js"),
            bundle: "main.min.js".into(),
            hash: false,
            indent: 2,
        }
    }
}

impl ScriptsConfig {
    pub fn sources(&self) -> SourceSet<'_> {
        SourceSet {
            field: "scripts",
            src: &self.src,
            dest: &self.dest,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.sources().validate(diag);
        super::validate_bundle_name("scripts.bundle", &self.bundle, "js", diag);
        if self.indent > 8 {
            diag.error("scripts.indent", "must be between 0 and 8");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_scripts_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.scripts.bundle, "main.min.js");
        assert_eq!(config.scripts.indent, 2);
    }

    #[test]
    fn test_bundle_extension_checked() {
        let config = test_parse_config("[scripts]\nbundle = \"main.min.css\"");
        let mut diag = ConfigDiagnostics::new();
        config.scripts.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field, "scripts.bundle");
    }
}
