//! `fonts`: copy font files.

use anyhow::Result;

use crate::graph::TaskContext;
use crate::pipeline::{ErrorGuard, Pipeline};

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let dest = config.root_join(&config.fonts.dest);
    Pipeline::src("fonts", config.get_root(), &config.fonts.src, ErrorGuard::Halt)?.dest(&dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::utils::fs::write_file;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fonts_copied_verbatim() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("src/assets/fonts/inter/inter.woff2"), b"\x00wOF2").unwrap();

        run(&TaskContext::new(test_config_at(root))).unwrap();

        assert_eq!(
            fs::read(root.join("dist/assets/fonts/inter/inter.woff2")).unwrap(),
            b"\x00wOF2"
        );
    }
}
