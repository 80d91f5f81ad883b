//! `clean`: wipe the output directory.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};

use crate::graph::TaskContext;
use crate::{debug, log};

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let target = config.root_join(&config.clean);
    if remove_dir(&target)? {
        log!("clean"; "removed {}", config.root_relative(&target).display());
    } else {
        debug!("clean"; "{} does not exist", target.display());
    }
    Ok(())
}

/// Remove `dir` recursively. Returns `false` when it did not exist.
fn remove_dir(dir: &Path) -> Result<bool> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", dir.display())),
    }
}
