//! `favicons`: generate platform icons from one source image.

use anyhow::Result;

use crate::graph::TaskContext;
use crate::log;
use crate::pipeline::{ErrorGuard, Pipeline, SourceFile};
use crate::transform::favicon;

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let favicons = &config.favicons;
    let dest = config.root_join(&favicons.dest);

    for platform in favicons.icons.unsupported() {
        log!("favicons"; "warning: `{platform}` icons are not generated, skipping");
    }

    let mut source = Pipeline::src("favicons", config.get_root(), &favicons.src, ErrorGuard::Halt)?.into_files();
    if source.len() > 1 {
        log!(
            "favicons";
            "warning: {} source images found, using {}",
            source.len(),
            config.root_relative(&source[0].path).display()
        );
        source.truncate(1);
    }

    Pipeline::from_files("favicons", ErrorGuard::Halt, source)
        .pipe_many(|file| {
            let icons = favicon::generate(&file.contents, favicons)?;
            Ok(icons
                .into_iter()
                .map(|icon| SourceFile::new(file.base.join(&icon.name), file.base.clone(), icon.contents))
                .collect())
        })?
        .dest(&dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::utils::fs::write_file;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn logo() -> Vec<u8> {
        let img = RgbaImage::from_pixel(96, 64, Rgba([200, 30, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_icons_written_flat() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("src/favicons/logo.png"), &logo()).unwrap();

        run(&TaskContext::new(test_config_at(root))).unwrap();

        let out = root.join("dist/favicons");
        for name in ["favicon.ico", "favicon-32x32.png", "apple-touch-icon.png", "manifest.json", "favicons.html"] {
            assert!(out.join(name).exists(), "{name} missing");
        }
        let icon = image::load_from_memory(&fs::read(out.join("android-chrome-192x192.png")).unwrap()).unwrap();
        assert_eq!((icon.width(), icon.height()), (192, 192));
        assert!(!out.join("logo.png").exists());
    }

    #[test]
    fn test_first_source_wins() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("src/favicons/a.png"), &logo()).unwrap();
        write_file(&root.join("src/favicons/b.png"), b"not an image").unwrap();

        run(&TaskContext::new(test_config_at(root))).unwrap();
        assert!(root.join("dist/favicons/favicon.ico").exists());
    }

    #[test]
    fn test_undecodable_source_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("src/favicons/logo.png"), b"not an image").unwrap();

        assert!(run(&TaskContext::new(test_config_at(root))).is_err());
    }

    #[test]
    fn test_no_source_is_ok() {
        let dir = TempDir::new().unwrap();
        run(&TaskContext::new(test_config_at(dir.path()))).unwrap();
        assert!(!dir.path().join("dist/favicons").exists());
    }
}
