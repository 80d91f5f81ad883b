//! `[sass]` section.
//!
//! ```toml
//! [sass]
//! src = ["./src/assets/styles/sass/**/*.{scss,sass}"]
//! dest = "./dist/assets/css/"
//! bundle = "styles.min.css"   # production bundle name
//! hash = false                # styles.min.<hash>.css
//! load_paths = []             # extra @use/@import roots
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::SourceSet;
use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    pub src: Vec<String>,
    pub dest: PathBuf,
    pub bundle: String,
    pub hash: bool,
    pub load_paths: Vec<PathBuf>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            src: vec!["./src/assets/styles/sass/**/*.{scss,sass}".into()],
            dest: PathBuf::from("./dist/assets/css/"),
            bundle: "styles.min.css".into(),
            hash: false,
            load_paths: Vec::new(),
        }
    }
}

impl StylesConfig {
    pub fn sources(&self) -> SourceSet<'_> {
        SourceSet {
            field: "sass",
            src: &self.src,
            dest: &self.dest,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.sources().validate(diag);
        super::validate_bundle_name("sass.bundle", &self.bundle, "css", diag);
    }
}
