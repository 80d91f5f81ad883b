//! Filesystem helpers used by tasks.

use anyhow::{Context, Result};
use jwalk::WalkDir;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

/// All regular files under `dir`, sorted. A missing directory yields nothing.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<_> = WalkDir::new(dir)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/c.txt");
        write_file(&target, b"hi").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"hi");
    }

    #[test]
    fn test_collect_files_sorted() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("b.txt"), b"").unwrap();
        write_file(&dir.path().join("a/z.txt"), b"").unwrap();
        write_file(&dir.path().join(".hidden"), b"").unwrap();

        let files = collect_files(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![PathBuf::from(".hidden"), PathBuf::from("a/z.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn test_collect_missing_dir() {
        assert!(collect_files(Path::new("/definitely/not/here")).is_empty());
    }
}
