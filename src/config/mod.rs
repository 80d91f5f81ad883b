//! Pipeline configuration management for `sluice.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One type per section, each with its own defaults
//! ├── error.rs       # ConfigError, ConfigDiagnostics
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The config file is optional. Without one, the built-in defaults describe
//! the conventional `src/` → `dist/` layout. The loaded value is immutable
//! and handed to every task through `Arc<Config>`.
//!
//! # Sections
//!
//! | Section             | Purpose                                          |
//! |---------------------|--------------------------------------------------|
//! | (top level)         | `production`, `clean`                            |
//! | `[project]`         | Archive location for `moveDist`                  |
//! | `[autoprefixer]`    | Browserslist targets for vendor prefixes         |
//! | `[html]` `[fonts]`  | Plain source/destination pairs                   |
//! | `[sass]`            | Stylesheets and production bundle                |
//! | `[scripts]`         | Scripts and production bundle                    |
//! | `[images]`          | Recompression options and cache                  |
//! | `[favicons]`        | Icon platforms and manifest values               |
//! | `[vendors.*]`       | Third-party js/css/sass/fonts                    |
//! | `[browsersync]`     | Dev server and live reload                       |
//! | `[watch]`           | Globs that re-run single tasks                   |

mod error;
pub mod section;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{
    AutoprefixerConfig, BrowsersyncConfig, FaviconsConfig, FontsConfig, HtmlConfig,
    ImagesConfig, PngLevel, ProjectConfig, ScriptsConfig, StylesConfig, VendorsConfig,
    WatchConfig,
};

use crate::{cli::Cli, debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sluice.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Enables minification, bundle rename, source maps and image recompression.
    pub production: bool,

    /// Directory wiped by `clean`.
    pub clean: PathBuf,

    pub project: ProjectConfig,
    pub autoprefixer: AutoprefixerConfig,
    pub browsersync: BrowsersyncConfig,
    pub html: HtmlConfig,
    pub sass: StylesConfig,
    pub scripts: ScriptsConfig,
    pub images: ImagesConfig,
    pub fonts: FontsConfig,
    pub favicons: FaviconsConfig,
    pub vendors: VendorsConfig,
    pub watch: WatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            root: PathBuf::new(),
            production: false,
            clean: PathBuf::from("./dist/"),
            project: ProjectConfig::default(),
            autoprefixer: AutoprefixerConfig::default(),
            browsersync: BrowsersyncConfig::default(),
            html: HtmlConfig::default(),
            sass: StylesConfig::default(),
            scripts: ScriptsConfig::default(),
            images: ImagesConfig::default(),
            fonts: FontsConfig::default(),
            favicons: FaviconsConfig::default(),
            vendors: VendorsConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, root) = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                let mut config = config;
                config.config_path = Some(path);
                (config, root)
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                (Self::default(), cwd)
            }
        };

        config.set_root(&root);
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {} (ignored): {}", name, ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = crate::utils::path::normalize_path(path);
    }

    /// Resolve a config path against the project root.
    ///
    /// `~` is expanded; absolute paths are returned unchanged.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = Path::new(&expanded);
        let stripped = path.strip_prefix(".").unwrap_or(path);
        if stripped.is_absolute() {
            stripped.to_path_buf()
        } else {
            self.root.join(stripped)
        }
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Globs that re-run `styles` under `watch`.
    pub fn watch_styles(&self) -> &[String] {
        self.watch.styles.as_deref().unwrap_or(&self.sass.src)
    }

    /// Globs that re-run `scripts` under `watch`.
    pub fn watch_scripts(&self) -> &[String] {
        self.watch.scripts.as_deref().unwrap_or(&self.scripts.src)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if cli.production {
            self.production = true;
        }
        if let Some(port) = cli.port {
            self.browsersync.port = port;
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.validate_clean(&mut diag);
        self.project.validate(&mut diag);
        self.autoprefixer.validate(&mut diag);
        self.browsersync.validate(&mut diag);
        self.html.sources().validate(&mut diag);
        self.sass.validate(&mut diag);
        self.scripts.validate(&mut diag);
        self.images.validate(&mut diag);
        self.fonts.sources().validate(&mut diag);
        self.favicons.validate(&mut diag);
        self.vendors.validate(&mut diag);
        self.watch.validate(&mut diag);

        if !self.production {
            for (field, on) in [("sass.hash", self.sass.hash), ("scripts.hash", self.scripts.hash)] {
                if on {
                    diag.warn(field, "only applies to production bundles");
                }
            }
        }

        Ok(diag.finish()?)
    }

    /// `clean` must point inside the project and never at the root itself.
    fn validate_clean(&self, diag: &mut ConfigDiagnostics) {
        let target = self.root_join(&self.clean);
        let normalized = lexical_normalize(&target);
        if normalized == lexical_normalize(&self.root) {
            diag.error_with_hint("clean", "refusing to wipe the project root", "e.g. clean = \"./dist/\"");
        } else if !normalized.starts_with(lexical_normalize(&self.root)) {
            diag.error("clean", "must be inside the project root");
        }
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Find config file by searching upward from `start`.
///
/// ```text
/// /home/user/site/src/assets/   ← cwd
/// /home/user/site/sluice.toml   ← found!
/// ```
fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config rooted at `root`.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> Config {
    let mut config = Config::default();
    config.set_root(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        assert!(Config::from_str("[html\nsrc = []").is_err());
    }

    #[test]
    fn test_defaults_match_layout() {
        let config = Config::default();
        assert!(!config.production);
        assert_eq!(config.clean, PathBuf::from("./dist/"));
        assert_eq!(config.sass.dest, PathBuf::from("./dist/assets/css/"));
        assert_eq!(config.scripts.dest, PathBuf::from("./dist/assets/js"));
        assert_eq!(config.images.dest, PathBuf::from("./dist/assets/img"));
        assert_eq!(config.favicons.dest, PathBuf::from("./dist/favicons/"));
        assert_eq!(config.project.archive_dir(), PathBuf::from("./../_package/project-name/v1.0.0"));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "production = true\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = Config::parse_with_ignored(content).unwrap();
        assert!(config.production);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_root_join() {
        let config = test_config_at(Path::new("/project"));
        assert_eq!(config.root_join("./dist/"), PathBuf::from("/project/dist/"));
        assert_eq!(config.root_join("src/a.html"), PathBuf::from("/project/src/a.html"));
        assert_eq!(config.root_join("/abs/out"), PathBuf::from("/abs/out"));
    }

    #[test]
    fn test_clean_must_stay_inside_root() {
        let mut config = test_config_at(Path::new("/project"));
        assert!(config.validate().is_ok());

        config.clean = PathBuf::from("./");
        assert!(config.validate().is_err());

        config.clean = PathBuf::from("../elsewhere");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hash_without_production_is_valid() {
        let mut config = test_config_at(Path::new("/project"));
        config.sass.hash = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_find_config_file_walks_upward() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("src/assets");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("sluice.toml"), "production = true").unwrap();

        let found = find_config_file(&nested, Path::new("sluice.toml")).unwrap();
        assert_eq!(found, dir.path().join("sluice.toml"));
        assert!(find_config_file(&nested, Path::new("missing.toml")).is_none());
    }
}
