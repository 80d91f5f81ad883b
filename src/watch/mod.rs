//! `watch`: re-run single tasks when their sources change.
//!
//! ```text
//! notify → Debouncer (300 ms, per path) → Router (globs → tasks) → Plan::Run(task)
//! ```
//!
//! | Globs             | Task      |
//! |-------------------|-----------|
//! | `watch.html`      | `html`    |
//! | `watch.styles`    | `styles`  |
//! | `watch.scripts`   | `scripts` |
//!
//! The live-reload side of `sync` runs its own watcher over
//! `browsersync.watch` through [`watch_paths`].

mod debouncer;


use debouncer::{ChangeKind, Debouncer};

use std::path::PathBuf;

use anyhow::{Context, Result};
use crossbeam::channel::{self, select};
use notify::{RecursiveMode, Watcher};

use crate::config::Config;
use crate::core::subscribe_shutdown;
use crate::glob::Globs;
use crate::graph::{Plan, TaskContext};
use crate::logger::{status_error, status_success};
use crate::task::Task;
use crate::utils::path::{dedup_roots, to_slash};
use crate::{debug, log};

/// Maps changed paths to the tasks that rebuild them.
#[derive(Debug)]
pub struct Router {
    routes: Vec<(Task, Globs)>,
}

impl Router {
    pub fn new(config: &Config) -> Result<Self> {
        let root = config.get_root();
        Ok(Self {
            routes: vec![
                (Task::Html, Globs::new(root, &config.watch.html)?),
                (Task::Styles, Globs::new(root, config.watch_styles())?),
                (Task::Scripts, Globs::new(root, config.watch_scripts())?),
            ],
        })
    }

    /// Tasks matched by any of `paths`, each at most once, in route order.
    pub fn route<'a>(&self, paths: impl IntoIterator<Item = &'a PathBuf>) -> Vec<Task> {
        let paths: Vec<_> = paths.into_iter().collect();
        self.routes
            .iter()
            .filter(|(_, globs)| paths.iter().any(|p| globs.is_match(p)))
            .map(|(task, _)| *task)
            .collect()
    }

    /// Directories to watch so that every route can fire.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .routes
            .iter()
            .flat_map(|(_, globs)| globs.watch_roots())
            .collect();
        dedup_roots(&mut roots);
        roots
    }
}

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let router = Router::new(config)?;
    let roots = router.watch_roots();
    if roots.is_empty() {
        log!("watch"; "no source directories exist, nothing to watch");
    } else {
        log!("watch"; "watching html, styles and scripts for changes");
    }

    watch_paths("watch", &roots, |changes| {
        let paths: Vec<&PathBuf> = changes.iter().map(|(path, _)| path).collect();
        for task in router.route(paths) {
            match Plan::Run(task).execute(&|t| t.run(ctx)) {
                Ok(()) => status_success(&format!("{task} rebuilt")),
                Err(err) => {
                    let err = anyhow::Error::from(err);
                    status_error(&format!("{task} failed"), &format!("{err:#}"));
                }
            }
        }
    })
}

/// Watch `roots` recursively until shutdown, calling `on_changes` once per
/// quiet debounce window.
pub(crate) fn watch_paths<F>(label: &'static str, roots: &[PathBuf], mut on_changes: F) -> Result<()>
where
    F: FnMut(Vec<(PathBuf, ChangeKind)>),
{
    let (tx, rx) = channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = tx.send(res);
    })
    .context("Failed to create file watcher")?;

    for root in roots {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;
        debug!(label; "watching {}", to_slash(root));
    }

    let shutdown = subscribe_shutdown();
    let mut debouncer = Debouncer::new();
    loop {
        select! {
            recv(rx) -> msg => match msg {
                Ok(Ok(event)) => debouncer.add_event(&event),
                Ok(Err(e)) => log!(label; "notify error: {}", e),
                Err(_) => break,
            },
            recv(shutdown) -> _ => break,
            default(debouncer.sleep_duration()) => {}
        }
        if let Some(changes) = debouncer.take_if_ready() {
            on_changes(changes);
        }
    }
    debug!(label; "stopped");
    Ok(())
}
