//! SVG minification using usvg.

use anyhow::{Context, Result};

/// Minify an SVG document.
///
/// Returns `None` for documents with `<text>`: usvg would need system
/// fonts to keep them, so they are left untouched.
pub fn minify(content: &[u8]) -> Result<Option<Vec<u8>>> {
    if contains_text(content) {
        return Ok(None);
    }

    let tree = usvg::Tree::from_data(content, &usvg::Options::default())
        .context("Failed to parse SVG")?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        attributes_indent: usvg::Indent::None,
        ..Default::default()
    };

    Ok(Some(tree.to_string(&write_options).into_bytes()))
}

#[inline]
fn contains_text(content: &[u8]) -> bool {
    content.windows(5).any(|w| w == b"<text")
}
