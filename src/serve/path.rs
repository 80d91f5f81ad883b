//! URL to filesystem path resolution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve a request URL under `base_dir`, serving `index.html` for
/// directories. `None` for missing files and anything escaping `base_dir`.
pub fn resolve_path(url: &str, base_dir: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = base_dir.join(&clean).canonicalize().ok()?;
    let root = base_dir.canonicalize().ok()?;
    if !canonical.starts_with(&root) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    let index = canonical.join("index.html");
    index.is_file().then_some(index)
}

/// Decode, strip query and fragment, trim slashes.
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fs::write_file;
    use tempfile::TempDir;

    fn site() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("dist");
        write_file(&base.join("index.html"), b"home").unwrap();
        write_file(&base.join("blog/index.html"), b"blog").unwrap();
        write_file(&base.join("assets/css/my styles.css"), b"a{}").unwrap();
        write_file(&dir.path().join("secret.txt"), b"no").unwrap();
        (dir, base)
    }

    #[test]
    fn test_directories_serve_index() {
        let (_dir, base) = site();
        let root = base.canonicalize().unwrap();
        assert_eq!(resolve_path("/", &base), Some(root.join("index.html")));
        assert_eq!(resolve_path("/blog/", &base), Some(root.join("blog/index.html")));
        assert_eq!(resolve_path("/blog", &base), Some(root.join("blog/index.html")));
    }

    #[test]
    fn test_percent_decoding_and_query() {
        let (_dir, base) = site();
        let root = base.canonicalize().unwrap();
        assert_eq!(
            resolve_path("/assets/css/my%20styles.css?v=3", &base),
            Some(root.join("assets/css/my styles.css"))
        );
    }

    #[test]
    fn test_traversal_rejected() {
        let (_dir, base) = site();
        assert_eq!(resolve_path("/../secret.txt", &base), None);
        assert_eq!(resolve_path("/%2e%2e/secret.txt", &base), None);
        assert_eq!(resolve_path("/assets/../../secret.txt", &base), None);
    }

    #[test]
    fn test_missing_is_none() {
        let (_dir, base) = site();
        assert_eq!(resolve_path("/nope.html", &base), None);
        assert_eq!(resolve_path("/assets/", &base), None);
    }
}
