//! Output file naming.

use std::path::Path;

use crate::utils::hash::fingerprint;

/// Production bundle name, optionally fingerprinted with the content hash.
///
/// `styles.min.css` → `styles.min.1a2b3c4d.css`
pub fn bundle_name(bundle: &str, contents: &[u8], hash: bool) -> String {
    if !hash {
        return bundle.to_string();
    }
    let digest = fingerprint(contents);
    match bundle.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.{digest}.{ext}"),
        None => format!("{bundle}.{digest}"),
    }
}

/// Name the concatenated sources go by before minification.
///
/// `styles.min.css` → `styles.css`
pub fn unminified_name(bundle: &str) -> String {
    bundle.replacen(".min.", ".", 1)
}

/// Add a `.min` suffix and force the extension.
///
/// `bootstrap.css` → `bootstrap.min.css`, `theme.scss` → `theme.min.css`
pub fn min_suffix(path: &Path, ext: &str) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    format!("{stem}.min.{ext}")
}
