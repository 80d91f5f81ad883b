//! `[vendors.*]` sections: third-party assets mirrored into `dist/assets/vendor`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{SourceSet, source_section};
use crate::config::ConfigDiagnostics;

source_section!(
    /// `[vendors.js]` minified to `*.min.js`.
    VendorScriptsConfig,
    "vendors.js",
    ["./src/assets/scripts/vendor/*.js"],
    "./dist/assets/vendor/js"
);

source_section!(
    /// `[vendors.css]` minified to `*.min.css`.
    VendorCssConfig,
    "vendors.css",
    ["./node_modules/bootstrap/dist/css/bootstrap.css"],
    "./dist/assets/vendor/css"
);

source_section!(
    /// `[vendors.sass]` compiled, prefixed and minified to `*.min.css`.
    VendorSassConfig,
    "vendors.sass",
    ["./src/assets/styles/vendor/*.{scss,sass}"],
    "./dist/assets/vendor/css"
);

source_section!(
    /// `[vendors.fonts]` icon-font webfonts, copied.
    VendorFontsConfig,
    "vendors.fonts",
    ["./node_modules/@fortawesome/fontawesome-free/webfonts/**/*"],
    "./dist/assets/vendor/fonts"
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorsConfig {
    pub js: VendorScriptsConfig,
    pub css: VendorCssConfig,
    pub sass: VendorSassConfig,
    pub fonts: VendorFontsConfig,
}

impl VendorsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.js.sources().validate(diag);
        self.css.sources().validate(diag);
        self.sass.sources().validate(diag);
        self.fonts.sources().validate(diag);
    }
}
