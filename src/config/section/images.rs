//! `[images]` section.
//!
//! Recompression only runs with `production = true`; otherwise images
//! are copied.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::SourceSet;
use crate::config::ConfigDiagnostics;

/// Lossless PNG effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PngLevel {
    Fast,
    Default,
    #[default]
    Best,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub src: Vec<String>,
    pub dest: PathBuf,
    /// JPEG quality tried first.
    pub jpeg_quality: u8,
    /// Fallback JPEG quality when the first attempt does not shrink the file.
    pub jpeg_min_quality: u8,
    pub png_level: PngLevel,
    /// Reuse results from previous runs.
    pub cache: bool,
    pub cache_dir: PathBuf,
    /// Log per-file savings.
    pub verbose: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            src: vec!["./src/assets/img/**/*".into()],
            dest: PathBuf::from("./dist/assets/img"),
            jpeg_quality: 70,
            jpeg_min_quality: 65,
            png_level: PngLevel::Best,
            cache: true,
            cache_dir: PathBuf::from(".sluice-cache/images"),
            verbose: true,
        }
    }
}

impl ImagesConfig {
    pub fn sources(&self) -> SourceSet<'_> {
        SourceSet {
            field: "images",
            src: &self.src,
            dest: &self.dest,
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.sources().validate(diag);
        for (field, q) in [
            ("images.jpeg_quality", self.jpeg_quality),
            ("images.jpeg_min_quality", self.jpeg_min_quality),
        ] {
            if !(1..=100).contains(&q) {
                diag.error(field, "must be between 1 and 100");
            }
        }
        if self.jpeg_min_quality > self.jpeg_quality {
            diag.error_with_hint(
                "images.jpeg_min_quality",
                "is greater than jpeg_quality",
                "the fallback quality should be the lower one",
            );
        }
    }
}
