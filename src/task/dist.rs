//! `moveDist`: copy the built output into the versioned archive.
//!
//! Only names with an extension are copied (`<clean>/**/*.*`), which skips
//! dotfiles and extensionless leftovers.

use anyhow::Result;

use crate::graph::TaskContext;
use crate::log;
use crate::pipeline::{ErrorGuard, Pipeline};
use crate::utils::path::to_slash;

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let output = config.root_relative(config.root_join(&config.clean));
    let glob = format!("{}/**/*.*", to_slash(&output).trim_end_matches('/'));
    let archive = config.root_join(config.project.archive_dir());

    let copied = Pipeline::src("moveDist", config.get_root(), &[glob], ErrorGuard::Halt)?
        .dest(&archive)?
        .into_files();
    log!("moveDist"; "copied {} file(s) to {}", copied.len(), archive.display());
    Ok(())
}
