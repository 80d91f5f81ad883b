//! Source/destination pairs shared by every asset category.
//!
//! Each category is its own type so that a partially written section
//! (`[html] dest = "out/"`) still falls back to that category's default
//! globs rather than an empty list.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::ConfigDiagnostics;

/// Borrowed view of a category's ordered globs and output directory.
#[derive(Debug, Clone, Copy)]
pub struct SourceSet<'a> {
    /// Field prefix used in diagnostics (`html`, `vendors.js`, ...).
    pub field: &'static str,
    pub src: &'a [String],
    pub dest: &'a Path,
}

impl SourceSet<'_> {
    /// Validate the set: at least one positive glob, every glob compiles.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.src.iter().any(|g| !g.starts_with('!')) {
            diag.error_with_hint(
                format!("{}.src", self.field),
                "needs at least one non-negated glob",
                "e.g. src = [\"src/**/*.html\"]",
            );
        }
        for glob in self.src {
            let pattern = glob.trim_start_matches('!');
            if let Err(e) = globset::Glob::new(crate::glob::strip_dot_slash(pattern)) {
                diag.error(format!("{}.src", self.field), format!("invalid glob `{glob}`: {e}"));
            }
        }
        if self.dest.as_os_str().is_empty() {
            diag.error(format!("{}.dest", self.field), "must not be empty");
        }
    }
}

/// Declare a category section with its default globs and destination.
macro_rules! source_section {
    ($(#[$meta:meta])* $name:ident, $field:literal, [$($glob:literal),* $(,)?], $dest:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            /// Ordered globs; `!` entries exclude earlier matches.
            pub src: Vec<String>,
            /// Output directory.
            pub dest: PathBuf,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    src: vec![$($glob.to_string()),*],
                    dest: PathBuf::from($dest),
                }
            }
        }

        impl $name {
            pub fn sources(&self) -> SourceSet<'_> {
                SourceSet {
                    field: $field,
                    src: &self.src,
                    dest: &self.dest,
                }
            }
        }
    };
}

pub(crate) use source_section;

source_section!(
    /// `[html]` pages with include directives.
    HtmlConfig,
    "html",
    ["./src/**/*.html", "!src/template/**/*"],
    "./dist/"
);

source_section!(
    /// `[fonts]` copied verbatim.
    FontsConfig,
    "fonts",
    ["./src/assets/fonts/**/*"],
    "./dist/assets/fonts"
);

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};
    use std::path::PathBuf;

    #[test]
    fn test_partial_section_keeps_default_globs() {
        let config = test_parse_config("[html]\ndest = \"out/\"");
        assert_eq!(config.html.dest, PathBuf::from("out/"));
        assert_eq!(
            config.html.src,
            vec!["./src/**/*.html".to_string(), "!src/template/**/*".to_string()]
        );
    }

    #[test]
    fn test_validate_rejects_only_negations() {
        let mut config = test_parse_config("");
        config.fonts.src = vec!["!src/**/*".into()];
        let mut diag = ConfigDiagnostics::new();
        config.fonts.sources().validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field, "fonts.src");
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let mut config = test_parse_config("");
        config.html.src = vec!["src/**/*.{html".into()];
        let mut diag = ConfigDiagnostics::new();
        config.html.sources().validate(&mut diag);
        assert!(diag.errors()[0].message.contains("invalid glob"));
    }
}
