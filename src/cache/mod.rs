//! On-disk cache for recompressed images.
//!
//! Entries live under `images.cache_dir` as files named by the blake3
//! digest of (input bytes, recompression options). An entry holds the
//! blake3 digest of the output followed by the output bytes, so a hit costs
//! one file read and no decoding.
//!
//! Entries are written to a temporary sibling and renamed into place. An
//! entry whose digest does not match its bytes is removed and treated as a
//! miss.
//!
//! `clean` only wipes the output directory; the cache survives.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::debug;
use crate::utils::fs::write_file;
use crate::utils::hash::hex_parts;

const DIGEST_LEN: usize = blake3::OUT_LEN;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
    enabled: bool,
}

impl ImageCache {
    pub fn new(dir: PathBuf, enabled: bool) -> Self {
        Self { dir, enabled }
    }

    /// Cache key for `input` processed with `options`.
    pub fn key<O: Serialize>(input: &[u8], options: &O) -> Result<String> {
        let options = serde_json::to_vec(options)?;
        Ok(hex_parts(&[input, options.as_slice()]))
    }

    fn entry(&self, key: &str) -> PathBuf {
        self.dir.join(&key[..2]).join(key)
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        if !self.enabled {
            return None;
        }
        let path = self.entry(key);
        let mut stored = fs::read(&path).ok()?;
        let valid = stored.len() >= DIGEST_LEN
            && blake3::hash(&stored[DIGEST_LEN..]).as_bytes()[..] == stored[..DIGEST_LEN];
        if !valid {
            debug!("images"; "dropping corrupt cache entry {}", key);
            let _ = fs::remove_file(&path);
            return None;
        }
        Some(stored.split_off(DIGEST_LEN))
    }

    /// Store an entry. Failing to write the cache never fails the caller.
    pub fn put(&self, key: &str, output: &[u8]) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.write_entry(&self.entry(key), output) {
            debug!("images"; "cache write failed: {:#}", e);
        }
    }

    fn write_entry(&self, path: &Path, output: &[u8]) -> Result<()> {
        let mut stored = Vec::with_capacity(DIGEST_LEN + output.len());
        stored.extend_from_slice(blake3::hash(output).as_bytes());
        stored.extend_from_slice(output);

        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp = path.with_extension(format!("{}-{n}.tmp", std::process::id()));
        write_file(&temp, &stored)?;
        fs::rename(&temp, path)
            .with_context(|| format!("Failed to rename {}", temp.display()))
            .inspect_err(|_| {
                let _ = fs::remove_file(&temp);
            })
    }

    /// Return the cached output for `key`, or compute and store it.
    ///
    /// The second value is `true` on a cache hit.
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> Result<(Vec<u8>, bool)>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        if let Some(hit) = self.get(key) {
            return Ok((hit, true));
        }
        let output = compute()?;
        self.put(key, &output);
        Ok((output, false))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    #[test]
    fn test_key_depends_on_options() {
        let a = ImageCache::key(b"img", &("best", 70)).unwrap();
        let b = ImageCache::key(b"img", &("fast", 70)).unwrap();
        let c = ImageCache::key(b"img", &("best", 70)).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_hit_skips_compute() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path().join("cache"), true);
        let key = ImageCache::key(b"input", &1).unwrap();
        let calls = Cell::new(0);

        let compute = || {
            calls.set(calls.get() + 1);
            Ok(b"output".to_vec())
        };
        let (first, hit) = cache.get_or_insert_with(&key, compute).unwrap();
        assert!(!hit);
        let (second, hit) = cache.get_or_insert_with(&key, compute).unwrap();
        assert!(hit);

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_put_leaves_only_the_entry() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path().join("cache"), true);
        let key = ImageCache::key(b"input", &1).unwrap();
        cache.put(&key, b"output");
        cache.put(&key, b"output");

        let names: Vec<_> = fs::read_dir(cache.entry(&key).parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, [std::ffi::OsString::from(&key)]);
        assert_eq!(cache.get(&key).unwrap(), b"output");
    }

    #[test]
    fn test_truncated_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path().join("cache"), true);
        let key = ImageCache::key(b"input", &1).unwrap();
        cache.put(&key, b"a long recompressed image");

        let entry = cache.entry(&key);
        let stored = fs::read(&entry).unwrap();
        fs::write(&entry, &stored[..stored.len() - 4]).unwrap();

        assert!(cache.get(&key).is_none());
        assert!(!entry.exists());
        let (output, hit) = cache
            .get_or_insert_with(&key, || Ok(b"fresh".to_vec()))
            .unwrap();
        assert!(!hit);
        assert_eq!(output, b"fresh");
        assert_eq!(cache.get(&key).unwrap(), b"fresh");
    }

    #[test]
    fn test_disabled_cache_always_computes() {
        let dir = TempDir::new().unwrap();
        let cache = ImageCache::new(dir.path().join("cache"), false);
        let key = ImageCache::key(b"input", &1).unwrap();
        cache.put(&key, b"out");
        assert!(cache.get(&key).is_none());
        assert!(!cache.dir().exists());
    }
}
