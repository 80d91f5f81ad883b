//! Task orchestration.
//!
//! A [`Plan`] is the data form of a task graph:
//!
//! ```text
//! build   = series(clean, parallel(html, styles, scripts, fonts, images, favicons, vendor))
//! vendor  = series(vendor:scripts, vendor:sass, vendor:css, vendor:fonts)
//! serve   = parallel(watch, sync)
//! default = series(build, serve)
//! ```
//!
//! `Run(task)` of a composite task expands to that task's own plan, so
//! every named task (leaf or composite) gets a `starting`/`finished` line.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;

use crate::config::Config;
use crate::logger::format_elapsed;
use crate::log;
use crate::task::Task;

/// Shared, immutable state handed to every task run.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub config: Arc<Config>,
}

impl TaskContext {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// A task failure, carrying the failing leaf and its cause.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task '{task}' failed")]
    Failed {
        task: Task,
        #[source]
        source: anyhow::Error,
    },
}

impl TaskError {
    /// The leaf task that failed.
    #[cfg(test)]
    pub fn task(&self) -> Task {
        match self {
            Self::Failed { task, .. } => *task,
        }
    }
}

/// Sequential/concurrent composition of tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Run(Task),
    Series(Vec<Plan>),
    Parallel(Vec<Plan>),
}

impl Plan {
    pub fn series(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self::Series(tasks.into_iter().map(Self::Run).collect())
    }

    pub fn parallel(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self::Parallel(tasks.into_iter().map(Self::Run).collect())
    }

    /// Execute the plan, running leaves through `runner`.
    ///
    /// `Series` stops at the first failure. `Parallel` waits for every
    /// member and reports the failure that happened first.
    pub fn execute<F>(&self, runner: &F) -> Result<(), TaskError>
    where
        F: Fn(Task) -> anyhow::Result<()> + Sync,
    {
        match self {
            Self::Run(task) => run_logged(*task, runner),
            Self::Series(plans) => plans.iter().try_for_each(|plan| plan.execute(runner)),
            Self::Parallel(plans) => {
                let first_failure: Mutex<Option<TaskError>> = Mutex::new(None);
                thread::scope(|scope| {
                    for plan in plans {
                        let first_failure = &first_failure;
                        scope.spawn(move || {
                            if let Err(err) = plan.execute(runner) {
                                first_failure.lock().get_or_insert(err);
                            }
                        });
                    }
                });
                match first_failure.into_inner() {
                    Some(err) => Err(err),
                    None => Ok(()),
                }
            }
        }
    }

    /// Flatten the plan into the leaf tasks it would run, in declaration
    /// order. Fails when expansion does not terminate within `max_depth`.
    #[cfg(test)]
    pub fn leaves(&self, max_depth: usize) -> Option<Vec<Task>> {
        let mut out = Vec::new();
        self.collect_leaves(max_depth, &mut out).then_some(out)
    }

    #[cfg(test)]
    fn collect_leaves(&self, depth: usize, out: &mut Vec<Task>) -> bool {
        if depth == 0 {
            return false;
        }
        match self {
            Self::Run(task) => match task.plan() {
                Some(plan) => plan.collect_leaves(depth - 1, out),
                None => {
                    out.push(*task);
                    true
                }
            },
            Self::Series(plans) | Self::Parallel(plans) => plans
                .iter()
                .all(|plan| plan.collect_leaves(depth - 1, out)),
        }
    }
}

/// Run one named task with gulp-style start/finish lines.
fn run_logged<F>(task: Task, runner: &F) -> Result<(), TaskError>
where
    F: Fn(Task) -> anyhow::Result<()> + Sync,
{
    let started = Instant::now();
    log!("task"; "starting '{}'", task);

    let result = match task.plan() {
        Some(plan) => plan.execute(runner),
        None => runner(task).map_err(|source| TaskError::Failed { task, source }),
    };

    let elapsed = format_elapsed(started.elapsed());
    match &result {
        Ok(()) => log!("task"; "finished '{}' after {}", task, elapsed),
        Err(_) => log!("error"; "'{}' errored after {}", task, elapsed),
    }
    result
}

// ============================================================================
// Task tree (`--tasks`)
// ============================================================================

/// Render the task tree printed by `--tasks`.
///
/// ```text
/// ├── clean
/// ├─┬ vendor
/// │ └─┬ <series>
/// │   ├── vendor:scripts
/// │   └── vendor:fonts
/// ```
pub fn render_task_tree() -> String {
    let mut out = String::new();
    let tasks = Task::ALL;
    for (i, task) in tasks.iter().enumerate() {
        let last = i + 1 == tasks.len();
        match task.plan() {
            Some(plan) => {
                out.push_str(&format!("{}─┬ {}\n", branch(last), task));
                render_plan(&plan, indent(last), true, &mut out);
            }
            None => out.push_str(&format!("{}── {}\n", branch(last), task)),
        }
    }
    out
}

fn render_plan(plan: &Plan, prefix: &str, last: bool, out: &mut String) {
    match plan {
        Plan::Run(task) => out.push_str(&format!("{prefix}{}── {}\n", branch(last), task)),
        Plan::Series(plans) | Plan::Parallel(plans) => {
            let label = if matches!(plan, Plan::Series(_)) {
                "<series>"
            } else {
                "<parallel>"
            };
            out.push_str(&format!("{prefix}{}─┬ {label}\n", branch(last)));
            let child_prefix = format!("{prefix}{}", indent(last));
            for (i, child) in plans.iter().enumerate() {
                render_plan(child, &child_prefix, i + 1 == plans.len(), out);
            }
        }
    }
}

fn branch(last: bool) -> &'static str {
    if last { "└" } else { "├" }
}

fn indent(last: bool) -> &'static str {
    if last { "  " } else { "│ " }
}
