//! File pipelines.
//!
//! Every asset task is a pipeline over in-memory files:
//!
//! ```text
//! src(globs) → pipe(step) → ... → [minify → concat → rename → write_maps] → dest(dir)
//! ```
//!
//! Steps run per file on the rayon pool. A file's output path is
//! `dest / (path relative to base)`, where `base` is the glob base of the
//! pattern that selected it.
//!
//! Per-file failures go through the pipeline's [`ErrorGuard`]: `Plumber`
//! logs the failure and drops the file, `Halt` fails the whole task.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::json;

use crate::glob::{Globs, Matched};
use crate::utils::fs::write_file;
use crate::utils::path::to_slash;
use crate::{debug, log};

/// What a pipeline does with a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorGuard {
    /// Log the failure, drop the file, keep going.
    Plumber,
    /// First failure fails the task.
    Halt,
}

/// A file travelling through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub base: PathBuf,
    pub contents: Vec<u8>,
    /// Source map JSON for `contents`, written by [`Pipeline::write_maps`].
    pub source_map: Option<String>,
}

impl SourceFile {
    pub fn new(path: PathBuf, base: PathBuf, contents: Vec<u8>) -> Self {
        Self {
            path,
            base,
            contents,
            source_map: None,
        }
    }

    /// Read a matched file from disk.
    pub fn read(matched: Matched) -> Result<Self> {
        let contents = std::fs::read(&matched.path)
            .with_context(|| format!("Failed to read {}", matched.path.display()))?;
        Ok(Self::new(matched.path, matched.base, contents))
    }

    /// Path relative to the glob base; this is the path under `dest`.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    /// Contents as UTF-8.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents)
            .with_context(|| format!("{} is not valid UTF-8", self.path.display()))
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Replace the file name, keeping the directory.
    pub fn set_file_name(&mut self, name: &str) {
        self.path.set_file_name(name);
    }

    pub fn set_extension(&mut self, ext: &str) {
        self.path.set_extension(ext);
    }
}

/// An ordered batch of files plus the guard that decides failure handling.
#[derive(Debug)]
pub struct Pipeline {
    label: &'static str,
    guard: ErrorGuard,
    files: Vec<SourceFile>,
}

impl Pipeline {
    /// Read every file selected by `globs`, sorted by path.
    ///
    /// Read failures go through the guard like any other step.
    pub fn src(label: &'static str, root: &Path, globs: &[String], guard: ErrorGuard) -> Result<Self> {
        let matched = Globs::new(root, globs)?.walk()?;
        if matched.is_empty() {
            debug!(label; "no files match {}", globs.join(", "));
        }
        let results: Vec<_> = matched
            .into_par_iter()
            .map(|m| {
                let path = m.path.clone();
                (path, SourceFile::read(m))
            })
            .collect();
        let files = Self::guard_with(label, guard, results)?;
        Ok(Self { label, guard, files })
    }

    /// Pipeline over files already in memory.
    pub fn from_files(label: &'static str, guard: ErrorGuard, files: Vec<SourceFile>) -> Self {
        Self { label, guard, files }
    }

    #[cfg(test)]
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn into_files(self) -> Vec<SourceFile> {
        self.files
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Apply `step` to every file.
    pub fn pipe<F>(self, step: F) -> Result<Self>
    where
        F: Fn(SourceFile) -> Result<SourceFile> + Sync + Send,
    {
        self.pipe_many(|file| step(file).map(|f| vec![f]))
    }

    /// Apply `step` only when `enabled`.
    pub fn pipe_if<F>(self, enabled: bool, step: F) -> Result<Self>
    where
        F: Fn(SourceFile) -> Result<SourceFile> + Sync + Send,
    {
        if enabled { self.pipe(step) } else { Ok(self) }
    }

    /// Apply a step that turns one file into any number of files.
    pub fn pipe_many<F>(self, step: F) -> Result<Self>
    where
        F: Fn(SourceFile) -> Result<Vec<SourceFile>> + Sync + Send,
    {
        let results: Vec<_> = self
            .files
            .into_par_iter()
            .map(|file| {
                let path = file.path.clone();
                (path, step(file))
            })
            .collect();
        let files = Self::guard_with(self.label, self.guard, results)?
            .into_iter()
            .flatten()
            .collect();
        Ok(Self {
            label: self.label,
            guard: self.guard,
            files,
        })
    }

    /// Keep only files matching `keep`.
    pub fn filter<F>(mut self, keep: F) -> Self
    where
        F: Fn(&SourceFile) -> bool,
    {
        self.files.retain(|f| keep(f));
        self
    }

    /// Join every file into one named `name`, newline separated.
    ///
    /// The bundle sits at the base of the first file, so it lands directly
    /// in `dest`. An empty pipeline stays empty. When every file carries a
    /// source map, the bundle gets an index map with one section per file.
    pub fn concat(self, name: &str) -> Result<Self> {
        let Some(first) = self.files.first() else {
            return Ok(self);
        };
        let base = first.base.clone();
        let mapped = self.files.iter().all(|f| f.source_map.is_some());

        let mut contents = Vec::new();
        let mut sections = Vec::new();
        let mut line = 0;
        for (i, file) in self.files.iter().enumerate() {
            if i > 0 && !contents.ends_with(b"\n") {
                contents.push(b'\n');
                line += 1;
            }
            if let Some(map) = file.source_map.as_deref().filter(|_| mapped) {
                let map: serde_json::Value = serde_json::from_str(map)
                    .with_context(|| format!("Invalid source map for {}", to_slash(&file.path)))?;
                sections.push(json!({ "offset": { "line": line, "column": 0 }, "map": map }));
            }
            contents.extend_from_slice(&file.contents);
            line += file.contents.iter().filter(|&&b| b == b'\n').count();
        }

        let mut bundle = SourceFile::new(base.join(name), base, contents);
        if mapped {
            bundle.source_map = Some(json!({ "version": 3, "sections": sections }).to_string());
        }
        Ok(Self {
            label: self.label,
            guard: self.guard,
            files: vec![bundle],
        })
    }

    /// Emit `<file>.map` for every file carrying a source map, and point
    /// the file at it with a `sourceMappingURL` comment.
    pub fn write_maps(self) -> Self {
        let mut files = Vec::with_capacity(self.files.len() * 2);
        for mut file in self.files {
            let Some(map) = file.source_map.take() else {
                files.push(file);
                continue;
            };
            let map_name = format!("{}.map", file.file_name());
            let comment = source_mapping_comment(&file.path, &map_name);
            if !file.contents.ends_with(b"\n") {
                file.contents.push(b'\n');
            }
            file.contents.extend_from_slice(comment.as_bytes());

            let mut map_path = file.path.clone();
            map_path.set_file_name(&map_name);
            let map_file = SourceFile::new(map_path, file.base.clone(), map.into_bytes());
            files.push(file);
            files.push(map_file);
        }
        Self {
            label: self.label,
            guard: self.guard,
            files,
        }
    }

    /// Write every file under `dir`, re-emitting them at their new paths.
    pub fn dest(self, dir: &Path) -> Result<Self> {
        let results: Vec<_> = self
            .files
            .into_par_iter()
            .map(|mut file| {
                let source = file.path.clone();
                let out = dir.join(file.relative());
                let written = write_file(&out, &file.contents).map(|()| {
                    file.path = out;
                    file.base = dir.to_path_buf();
                    file
                });
                (source, written)
            })
            .collect();
        let files = Self::guard_with(self.label, self.guard, results)?;
        debug!(self.label; "wrote {} file(s) to {}", files.len(), dir.display());
        Ok(Self {
            label: self.label,
            guard: self.guard,
            files,
        })
    }

    /// Apply the error guard to per-file results, preserving order.
    fn guard_with<T>(label: &str, guard: ErrorGuard, results: Vec<(PathBuf, Result<T>)>) -> Result<Vec<T>> {
        let mut kept = Vec::with_capacity(results.len());
        for (path, result) in results {
            match result {
                Ok(value) => kept.push(value),
                Err(err) => match guard {
                    ErrorGuard::Halt => {
                        return Err(err.context(format!("{}", to_slash(&path))));
                    }
                    ErrorGuard::Plumber => {
                        log!("error"; "{}: {}: {:#}", label, to_slash(&path), err);
                    }
                },
            }
        }
        Ok(kept)
    }
}

/// Trailing comment linking a file to its map.
fn source_mapping_comment(path: &Path, map_name: &str) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some("css") => format!("/*# sourceMappingURL={map_name} */\n"),
        _ => format!("//# sourceMappingURL={map_name}\n"),
    }
}
