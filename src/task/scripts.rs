//! `scripts`: formatted JavaScript; in production also a minified,
//! source-mapped bundle.

use anyhow::Result;

use super::bundle::production_bundle;
use crate::graph::TaskContext;
use crate::pipeline::{ErrorGuard, Pipeline};
use crate::transform::js;

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let scripts = &config.scripts;
    let dest = config.root_join(&scripts.dest);

    let formatted = Pipeline::src("scripts", config.get_root(), &scripts.src, ErrorGuard::Plumber)?
        .pipe(|mut file| {
            let code = js::format(file.text()?, scripts.indent)?;
            file.contents = code.into_bytes();
            Ok(file)
        })?
        .dest(&dest)?;

    if config.production {
        production_bundle(formatted, &scripts.bundle, scripts.hash, |text, name| {
            let (mut code, map) = js::minify(text, Some(name))?;
            // Keeps the next file from continuing this one's last statement.
            code.truncate(code.trim_end().len());
            if !code.ends_with(';') {
                code.push(';');
            }
            Ok((code, map))
        })?
        .dest(&dest)?;
    }
    Ok(())
}
