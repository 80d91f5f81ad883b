//! `images`: copy images, recompressing them in production.
//!
//! Recompressed bytes are cached by (input, options) under
//! `images.cache_dir`, so unchanged images cost one read on later builds.

use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use anyhow::Result;

use crate::cache::ImageCache;
use crate::graph::TaskContext;
use crate::logger::format_bytes;
use crate::pipeline::{ErrorGuard, Pipeline};
use crate::transform::image::{ImageOptions, is_recompressible, recompress};
use crate::utils::path::to_slash;
use crate::{debug, log};

/// Running totals across the parallel pipeline.
#[derive(Debug, Default)]
struct Savings {
    files: AtomicUsize,
    before: AtomicU64,
    after: AtomicU64,
}

impl Savings {
    fn record(&self, before: usize, after: usize) {
        self.files.fetch_add(1, Ordering::Relaxed);
        self.before.fetch_add(before as u64, Ordering::Relaxed);
        self.after.fetch_add(after as u64, Ordering::Relaxed);
    }

    fn summary(&self) -> Option<String> {
        let files = self.files.load(Ordering::Relaxed);
        if files == 0 {
            return None;
        }
        let before = self.before.load(Ordering::Relaxed);
        let after = self.after.load(Ordering::Relaxed);
        Some(format!(
            "minified {files} image(s), saved {} ({:.1}%)",
            format_bytes(before.saturating_sub(after)),
            percent_saved(before, after),
        ))
    }
}

fn percent_saved(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    before.saturating_sub(after) as f64 * 100.0 / before as f64
}

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let images = &config.images;
    let dest = config.root_join(&images.dest);
    let options = ImageOptions::from(images);
    let cache = ImageCache::new(config.root_join(&images.cache_dir), images.cache);
    if config.production && images.cache {
        debug!("images"; "cache at {}", to_slash(&config.root_relative(cache.dir())));
    }
    let savings = Savings::default();

    Pipeline::src("images", config.get_root(), &images.src, ErrorGuard::Halt)?
        .pipe_if(config.production, |mut file| {
            if !is_recompressible(&file.path) {
                return Ok(file);
            }
            let before = file.contents.len();
            let (output, hit) = optimize(&cache, &file.path, &file.contents, &options)?;
            savings.record(before, output.len());
            if images.verbose {
                log_saving(file.relative(), before, output.len(), hit);
            }
            file.contents = output;
            Ok(file)
        })?
        .dest(&dest)?;

    if config.production {
        match savings.summary() {
            Some(summary) => log!("images"; "{summary}"),
            None => debug!("images"; "nothing to recompress"),
        }
    }
    Ok(())
}

/// Final bytes for one image: the recompressed output, or the input when
/// recompression does not shrink it. Either way the result is cached.
fn optimize(cache: &ImageCache, path: &Path, input: &[u8], options: &ImageOptions) -> Result<(Vec<u8>, bool)> {
    let key = ImageCache::key(input, options)?;
    cache.get_or_insert_with(&key, || {
        Ok(recompress(path, input, options)?.unwrap_or_else(|| input.to_vec()))
    })
}

fn log_saving(path: &Path, before: usize, after: usize, hit: bool) {
    let saved = before.saturating_sub(after);
    let cached = if hit { " (cached)" } else { "" };
    if saved == 0 {
        log!("images"; "{}: already optimized{cached}", to_slash(path));
    } else {
        log!(
            "images";
            "{}: saved {} ({:.1}%){cached}",
            to_slash(path),
            format_bytes(saved as u64),
            percent_saved(before as u64, after as u64),
        );
    }
}
