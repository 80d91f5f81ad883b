//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

use crate::task::Task;

/// sluice front-end asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Tasks to run (default: `default`)
    #[arg(value_enum, value_name = "TASK")]
    pub tasks: Vec<Task>,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: sluice.toml)
    #[arg(short = 'C', long, default_value = "sluice.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable production steps (minify, bundle rename, source maps, image recompression)
    #[arg(short, long)]
    pub production: bool,

    /// Run the given tasks one after another instead of concurrently
    #[arg(long)]
    pub series: bool,

    /// Print the task tree and exit
    #[arg(short = 'T', long = "tasks")]
    pub list_tasks: bool,

    /// Override the dev server port
    #[arg(long)]
    pub port: Option<u16>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Tasks requested on the command line, falling back to `default`.
    pub fn requested_tasks(&self) -> Vec<Task> {
        if self.tasks.is_empty() {
            vec![Task::Default]
        } else {
            self.tasks.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_task_means_default() {
        let cli = Cli::parse_from(["sluice"]);
        assert_eq!(cli.requested_tasks(), vec![Task::Default]);
        assert!(!cli.production);
        assert!(!cli.series);
    }

    #[test]
    fn test_task_names_parse() {
        let cli = Cli::parse_from(["sluice", "vendor:sass", "moveDist", "styles"]);
        assert_eq!(
            cli.requested_tasks(),
            vec![Task::VendorSass, Task::MoveDist, Task::Styles]
        );
    }

    #[test]
    fn test_production_flag_before_task() {
        let cli = Cli::parse_from(["sluice", "-p", "build"]);
        assert!(cli.production);
        assert_eq!(cli.requested_tasks(), vec![Task::Build]);
    }

    #[test]
    fn test_verbose_and_version_flags_distinct() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::parse_from(["sluice", "-v", "--series", "styles"]);
        assert!(cli.verbose);
        assert!(cli.series);

        let err = Cli::try_parse_from(["sluice", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_unknown_task_rejected() {
        assert!(Cli::try_parse_from(["sluice", "stylez"]).is_err());
    }
}
