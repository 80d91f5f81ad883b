//! Ordered glob sets with negation.
//!
//! A set is an ordered list like `["src/**/*.html", "!src/template/**/*"]`.
//! Patterns are evaluated in order: a positive match includes the file, a
//! later negative match excludes it again, and a later positive match can
//! re-include it. Each matched file remembers the *base* of the pattern
//! that included it (the literal directory prefix before the first
//! wildcard), so outputs keep their path relative to that base:
//!
//! ```text
//! src/**/*.html      base = src       src/about/index.html → about/index.html
//! src/favicons/*.png base = src/favicons
//! vendor/app.css     base = vendor    (no wildcard: parent directory)
//! ```
//!
//! Dotfiles are never matched by wildcards.

use anyhow::{Context, Result, bail};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Component, Path, PathBuf};

use crate::debug;
use crate::utils::path::{dedup_roots, to_slash};

/// Strip a leading `./` so patterns line up with root-relative paths.
pub fn strip_dot_slash(pattern: &str) -> &str {
    let mut pattern = pattern;
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    pattern
}

/// One compiled entry of a glob set.
#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    negated: bool,
    matcher: GlobMatcher,
    /// Root-relative literal prefix.
    base: PathBuf,
    /// Pattern has no wildcard: it names exactly one file.
    singular: bool,
}

impl Pattern {
    fn parse(raw: &str) -> Result<Self> {
        let (negated, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let body = strip_dot_slash(body);
        let matcher = GlobBuilder::new(body)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob `{raw}`"))?
            .compile_matcher();
        let (base, singular) = glob_base(body);
        Ok(Self {
            source: raw.to_string(),
            negated,
            matcher,
            base,
            singular,
        })
    }
}

/// Literal directory prefix of a pattern and whether it has no wildcard.
fn glob_base(pattern: &str) -> (PathBuf, bool) {
    let is_magic = |segment: &str| segment.contains(['*', '?', '[', '{']);
    let segments: Vec<&str> = pattern.split('/').collect();

    match segments.iter().position(|s| is_magic(s)) {
        Some(first_magic) => (segments[..first_magic].iter().collect(), false),
        None => {
            let parent = Path::new(pattern)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            (parent, true)
        }
    }
}

/// A file selected by a glob set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Absolute base directory; outputs are written relative to it.
    pub base: PathBuf,
}

impl Matched {
    /// Path relative to its glob base.
    #[cfg(test)]
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }
}

/// Ordered glob set resolved against a project root.
#[derive(Debug, Clone)]
pub struct Globs {
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl Globs {
    /// Compile `patterns` relative to `root`.
    pub fn new(root: &Path, patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::parse(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            root: root.to_path_buf(),
            patterns,
        })
    }

    /// Root-relative slash path, or `None` when `path` is outside the root.
    fn relative_key(&self, path: &Path) -> Option<String> {
        let rel = if path.is_absolute() {
            path.strip_prefix(&self.root).ok()?
        } else {
            path
        };
        let rel: PathBuf = rel
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        Some(to_slash(&rel))
    }

    /// Index of the positive pattern that finally includes `key`, if any.
    fn including_pattern(&self, key: &str) -> Option<usize> {
        let mut included = None;
        for (i, pattern) in self.patterns.iter().enumerate() {
            if !pattern.matcher.is_match(key) {
                continue;
            }
            if pattern.negated {
                included = None;
            } else if !pattern.singular && has_hidden_segment(key, &pattern.base) {
                continue;
            } else {
                included = Some(i);
            }
        }
        included
    }

    /// Whether `path` (absolute or root-relative) is selected by the set.
    pub fn is_match(&self, path: &Path) -> bool {
        self.relative_key(path)
            .is_some_and(|key| self.including_pattern(&key).is_some())
    }

    /// Every existing file selected by the set, sorted by path.
    ///
    /// A wildcard pattern that matches nothing is not an error. A pattern
    /// without wildcards must name an existing file.
    pub fn walk(&self) -> Result<Vec<Matched>> {
        let mut candidates = Vec::new();
        for pattern in self.patterns.iter().filter(|p| !p.negated) {
            let base = self.root.join(&pattern.base);
            if pattern.singular {
                let file = base.join(
                    Path::new(strip_dot_slash(&pattern.source))
                        .file_name()
                        .unwrap_or_default(),
                );
                if !file.is_file() {
                    bail!("file not found with singular glob: {}", pattern.source);
                }
                candidates.push(file);
                continue;
            }
            let found = crate::utils::fs::collect_files(&base);
            if found.is_empty() {
                debug!("glob"; "nothing under {} for {}", base.display(), pattern.source);
            }
            candidates.extend(found);
        }

        candidates.sort();
        candidates.dedup();

        Ok(candidates
            .into_iter()
            .filter_map(|path| {
                let key = self.relative_key(&path)?;
                let index = self.including_pattern(&key)?;
                let base = self.root.join(&self.patterns[index].base);
                Some(Matched { path, base })
            })
            .collect())
    }

    /// Existing directories that must be watched to observe this set.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .patterns
            .iter()
            .filter(|p| !p.negated)
            .map(|p| self.root.join(&p.base))
            .filter(|dir| dir.is_dir())
            .collect();
        dedup_roots(&mut roots);
        roots
    }
}

/// Whether any segment of `key` below `base` is a dotfile.
fn has_hidden_segment(key: &str, base: &Path) -> bool {
    let base = to_slash(base);
    let below = key
        .strip_prefix(base.as_str())
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(key);
    below.split('/').any(|segment| segment.starts_with('.'))
}
