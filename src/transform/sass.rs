//! Sass compilation using grass.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

/// Whether a Sass file is a partial (`_name.scss`), which is only ever
/// imported and never compiled on its own.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// Compile one Sass/SCSS file to expanded CSS.
///
/// Imports resolve against the file's own directory first, then
/// `load_paths`.
pub fn compile(path: &Path, load_paths: &[PathBuf]) -> Result<String> {
    let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }
    for load_path in load_paths {
        options = options.load_path(load_path);
    }
    grass::from_path(path, &options).map_err(|e| anyhow!("{e}"))
}
