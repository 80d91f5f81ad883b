//! Configuration section definitions.

mod browsersync;
mod favicons;
mod images;
mod project;
mod scripts;
mod source;
mod styles;
mod vendors;
mod watch;

pub use browsersync::BrowsersyncConfig;
pub use favicons::FaviconsConfig;
pub use images::{ImagesConfig, PngLevel};
pub use project::{AutoprefixerConfig, ProjectConfig};
pub use scripts::ScriptsConfig;
pub use source::{FontsConfig, HtmlConfig, SourceSet};
pub use styles::StylesConfig;
pub use vendors::VendorsConfig;
pub use watch::WatchConfig;

use source::source_section;

use super::ConfigDiagnostics;

/// Check that every glob in a list compiles and the list is not empty.
fn validate_globs(field: &'static str, globs: &[String], diag: &mut ConfigDiagnostics) {
    if globs.is_empty() {
        diag.error(field, "must contain at least one glob");
    }
    for glob in globs {
        let pattern = crate::glob::strip_dot_slash(glob.trim_start_matches('!'));
        if let Err(e) = globset::Glob::new(pattern) {
            diag.error(field, format!("invalid glob `{glob}`: {e}"));
        }
    }
}

/// Bundle names are plain file names with the expected extension.
fn validate_bundle_name(field: &'static str, name: &str, ext: &str, diag: &mut ConfigDiagnostics) {
    if name.contains(['/', '\\']) {
        diag.error(field, "must be a file name, not a path");
    } else if !name.ends_with(&format!(".{ext}")) {
        diag.error_with_hint(
            field,
            format!("must end with `.{ext}`"),
            format!("e.g. bundle = \"main.min.{ext}\""),
        );
    }
}
