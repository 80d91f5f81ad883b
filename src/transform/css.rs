//! CSS prefixing, formatting and minification using lightningcss.
//!
//! Vendor prefixes follow the configured browserslist queries. Source maps
//! are produced with parcel_sourcemap, the map type lightningcss prints into.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

/// Resolve browserslist queries to lightningcss targets.
pub fn targets(browsers: &[String]) -> Result<Targets> {
    let browsers = Browsers::from_browserslist(browsers).map_err(|e| anyhow!("browserslist: {e}"))?;
    Ok(browsers.map(Targets::from).unwrap_or_default())
}

/// Add vendor prefixes and pretty-print with 2-space indentation.
pub fn autoprefix(source: &str, filename: &str, targets: Targets) -> Result<String> {
    print(source, filename, targets, false, None)
}

/// Prefix and minify.
pub fn minify(source: &str, filename: &str, targets: Targets) -> Result<String> {
    print(source, filename, targets, true, None)
}

/// Prefix and minify, returning the code and its source map JSON.
///
/// `source_name` is the name recorded in the map's `sources`.
pub fn minify_with_map(source: &str, source_name: &str, targets: Targets) -> Result<(String, String)> {
    let mut map = SourceMap::new("/");
    map.add_source(source_name);
    map.set_source_content(0, source)
        .map_err(|e| anyhow!("source map: {e}"))?;

    let code = print(source, source_name, targets, true, Some(&mut map))?;
    let json = map.to_json(None).map_err(|e| anyhow!("source map: {e}"))?;
    Ok((code, json))
}

fn print(
    source: &str,
    filename: &str,
    targets: Targets,
    minify: bool,
    source_map: Option<&mut SourceMap>,
) -> Result<String> {
    let mut sheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{e}"))?;

    sheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let result = sheet
        .to_css(PrinterOptions {
            minify,
            source_map,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let mut code = result.code;
    if !minify && !code.ends_with('\n') {
        code.push('\n');
    }
    Ok(code)
}
