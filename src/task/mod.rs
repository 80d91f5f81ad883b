//! Named tasks.
//!
//! Leaves do the work; composites are plans over other tasks.
//!
//! | Task             | Kind      | Module                 |
//! |------------------|-----------|------------------------|
//! | `clean`          | leaf      | [`clean`]              |
//! | `html`           | leaf      | [`html`]               |
//! | `styles`         | leaf      | [`styles`]             |
//! | `scripts`        | leaf      | [`scripts`]            |
//! | `fonts`          | leaf      | [`fonts`]              |
//! | `images`         | leaf      | [`images`]             |
//! | `favicons`       | leaf      | [`favicons`]           |
//! | `vendor:*`       | leaf      | [`vendor`]             |
//! | `moveDist`       | leaf      | [`dist`]               |
//! | `watch`          | leaf      | `crate::watch`         |
//! | `sync`           | leaf      | `crate::serve`         |
//! | `vendor`         | composite |                        |
//! | `build`          | composite |                        |
//! | `serve`          | composite |                        |
//! | `default`        | composite |                        |

pub mod bundle;
pub mod clean;
pub mod dist;
pub mod favicons;
pub mod fonts;
pub mod html;
pub mod images;
pub mod scripts;
pub mod styles;
pub mod vendor;

use std::fmt;

use anyhow::Result;
use clap::ValueEnum;

use crate::graph::{Plan, TaskContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Task {
    Clean,
    Html,
    Styles,
    Scripts,
    Fonts,
    Images,
    Favicons,
    #[value(name = "vendor:scripts")]
    VendorScripts,
    #[value(name = "vendor:sass")]
    VendorSass,
    #[value(name = "vendor:css")]
    VendorCss,
    #[value(name = "vendor:fonts")]
    VendorFonts,
    Vendor,
    #[value(name = "moveDist")]
    MoveDist,
    Watch,
    Sync,
    Build,
    Serve,
    Default,
}

impl Task {
    /// Every task, in `--tasks` display order.
    pub const ALL: [Task; 18] = [
        Task::Clean,
        Task::Html,
        Task::Styles,
        Task::Scripts,
        Task::Fonts,
        Task::Images,
        Task::Favicons,
        Task::VendorScripts,
        Task::VendorSass,
        Task::VendorCss,
        Task::VendorFonts,
        Task::Vendor,
        Task::MoveDist,
        Task::Watch,
        Task::Sync,
        Task::Build,
        Task::Serve,
        Task::Default,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Html => "html",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Fonts => "fonts",
            Self::Images => "images",
            Self::Favicons => "favicons",
            Self::VendorScripts => "vendor:scripts",
            Self::VendorSass => "vendor:sass",
            Self::VendorCss => "vendor:css",
            Self::VendorFonts => "vendor:fonts",
            Self::Vendor => "vendor",
            Self::MoveDist => "moveDist",
            Self::Watch => "watch",
            Self::Sync => "sync",
            Self::Build => "build",
            Self::Serve => "serve",
            Self::Default => "default",
        }
    }

    /// Plan of a composite task; `None` for leaves.
    pub fn plan(self) -> Option<Plan> {
        let plan = match self {
            Self::Vendor => Plan::series([
                Self::VendorScripts,
                Self::VendorSass,
                Self::VendorCss,
                Self::VendorFonts,
            ]),
            Self::Build => Plan::Series(vec![
                Plan::Run(Self::Clean),
                Plan::parallel([
                    Self::Html,
                    Self::Styles,
                    Self::Scripts,
                    Self::Fonts,
                    Self::Images,
                    Self::Favicons,
                    Self::Vendor,
                ]),
            ]),
            Self::Serve => Plan::parallel([Self::Watch, Self::Sync]),
            Self::Default => Plan::series([Self::Build, Self::Serve]),
            _ => return None,
        };
        Some(plan)
    }

    /// Run the task.
    ///
    /// Composites run their plan directly; callers that want per-task
    /// start/finish lines go through [`Plan::execute`].
    pub fn run(self, ctx: &TaskContext) -> Result<()> {
        match self {
            Self::Clean => clean::run(ctx),
            Self::Html => html::run(ctx),
            Self::Styles => styles::run(ctx),
            Self::Scripts => scripts::run(ctx),
            Self::Fonts => fonts::run(ctx),
            Self::Images => images::run(ctx),
            Self::Favicons => favicons::run(ctx),
            Self::VendorScripts => vendor::scripts(ctx),
            Self::VendorSass => vendor::sass(ctx),
            Self::VendorCss => vendor::css(ctx),
            Self::VendorFonts => vendor::fonts(ctx),
            Self::MoveDist => dist::run(ctx),
            Self::Watch => crate::watch::run(ctx),
            Self::Sync => crate::serve::run(ctx),
            Self::Vendor | Self::Build | Self::Serve | Self::Default => {
                let plan = self.plan().unwrap_or(Plan::Series(Vec::new()));
                plan.execute(&|task| task.run(ctx))?;
                Ok(())
            }
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
