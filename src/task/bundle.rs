//! Production bundle step shared by `styles` and `scripts`.
//!
//! ```text
//! minify + map (per file) → concat(<bundle without .min>) → rename(bundle[, hash]) → write_maps
//! ```
//!
//! Each file is minified on its own so its map names the file itself,
//! recorded relative to the bundle's directory. `concat` then stitches the
//! per-file maps into one index map.

use anyhow::Result;

use crate::pipeline::Pipeline;
use crate::transform::rename::{bundle_name, unminified_name};
use crate::utils::path::to_slash;

/// Join `pipeline` into one minified, source-mapped bundle.
///
/// `minify` receives one file's text and the source name to record in its
/// map.
pub fn production_bundle<F>(pipeline: Pipeline, bundle: &str, hash: bool, minify: F) -> Result<Pipeline>
where
    F: Fn(&str, &str) -> Result<(String, Option<String>)> + Sync + Send,
{
    let bundled = pipeline
        .pipe(|mut file| {
            let source_name = to_slash(file.relative());
            let (code, map) = minify(file.text()?, &source_name)?;
            file.contents = code.into_bytes();
            file.source_map = map;
            Ok(file)
        })?
        .concat(&unminified_name(bundle))?
        .pipe(|mut file| {
            let name = bundle_name(bundle, &file.contents, hash);
            file.set_file_name(&name);
            Ok(file)
        })?
        .write_maps();
    Ok(bundled)
}
