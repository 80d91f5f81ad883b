//! sluice - A gulp-style front-end asset pipeline.

mod cache;
mod cli;
mod config;
mod core;
mod embed;
mod glob;
mod graph;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod task;
mod transform;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::Config;
use graph::{Plan, TaskContext, render_task_tree};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if cli.list_tasks {
        print!("{}", render_task_tree());
        return Ok(());
    }

    let ctx = TaskContext::new(Config::load(&cli)?);
    if let Some(path) = &ctx.config.config_path {
        debug!("config"; "using {}", path.display());
    }

    let tasks = cli.requested_tasks();
    let plan = if cli.series {
        Plan::series(tasks)
    } else {
        Plan::parallel(tasks)
    };

    if let Err(err) = plan.execute(&|task| task.run(&ctx)) {
        let err = anyhow::Error::from(err);
        log!("error"; "{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
