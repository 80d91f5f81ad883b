//! `vendor:*`: third-party assets.
//!
//! ```text
//! vendor:scripts  *.js          → minify        → *.min.js
//! vendor:sass     *.scss        → compile+minify → *.min.css   (partials skipped)
//! vendor:css      *.css         → minify        → *.min.css
//! vendor:fonts    webfonts/**   → copy
//! ```
//!
//! Vendor files are not ours to fix, so any failure fails the task.

use std::path::PathBuf;

use anyhow::Result;

use crate::graph::TaskContext;
use crate::pipeline::{ErrorGuard, Pipeline};
use crate::transform::rename::min_suffix;
use crate::transform::{css as css_transform, js, sass as sass_transform};

pub fn scripts(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let vendor = &config.vendors.js;
    Pipeline::src("vendor:scripts", config.get_root(), &vendor.src, ErrorGuard::Halt)?
        .pipe(|mut file| {
            let (code, _) = js::minify(file.text()?, None)?;
            file.contents = code.into_bytes();
            let name = min_suffix(&file.path, "js");
            file.set_file_name(&name);
            Ok(file)
        })?
        .dest(&config.root_join(&vendor.dest))?;
    Ok(())
}

pub fn sass(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let vendor = &config.vendors.sass;
    let targets = css_transform::targets(&config.autoprefixer.browsers)?;
    let load_paths: Vec<PathBuf> = config.sass.load_paths.iter().map(|p| config.root_join(p)).collect();

    Pipeline::src("vendor:sass", config.get_root(), &vendor.src, ErrorGuard::Halt)?
        .filter(|file| !sass_transform::is_partial(&file.path))
        .pipe(|mut file| {
            let compiled = sass_transform::compile(&file.path, &load_paths)?;
            let name = min_suffix(&file.path, "css");
            let minified = css_transform::minify(&compiled, &name, targets)?;
            file.contents = minified.into_bytes();
            file.set_file_name(&name);
            Ok(file)
        })?
        .dest(&config.root_join(&vendor.dest))?;
    Ok(())
}

pub fn css(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let vendor = &config.vendors.css;
    let targets = css_transform::targets(&config.autoprefixer.browsers)?;

    Pipeline::src("vendor:css", config.get_root(), &vendor.src, ErrorGuard::Halt)?
        .pipe(|mut file| {
            let minified = css_transform::minify(file.text()?, file.file_name(), targets)?;
            file.contents = minified.into_bytes();
            let name = min_suffix(&file.path, "css");
            file.set_file_name(&name);
            Ok(file)
        })?
        .dest(&config.root_join(&vendor.dest))?;
    Ok(())
}

pub fn fonts(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let vendor = &config.vendors.fonts;
    Pipeline::src("vendor:fonts", config.get_root(), &vendor.src, ErrorGuard::Halt)?
        .dest(&config.root_join(&vendor.dest))?;
    Ok(())
}
