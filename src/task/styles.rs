//! `styles`: Sass → prefixed, formatted CSS; in production also a
//! minified, source-mapped bundle.

use std::path::PathBuf;

use anyhow::Result;

use super::bundle::production_bundle;
use crate::graph::TaskContext;
use crate::pipeline::{ErrorGuard, Pipeline};
use crate::transform::{css, sass};

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let styles = &config.sass;
    let targets = css::targets(&config.autoprefixer.browsers)?;
    let load_paths: Vec<PathBuf> = styles
        .load_paths
        .iter()
        .map(|p| config.root_join(p))
        .collect();
    let dest = config.root_join(&styles.dest);

    let compiled = Pipeline::src("styles", config.get_root(), &styles.src, ErrorGuard::Plumber)?
        .filter(|file| !sass::is_partial(&file.path))
        .pipe(|mut file| {
            let compiled = sass::compile(&file.path, &load_paths)?;
            file.set_extension("css");
            let prefixed = css::autoprefix(&compiled, file.file_name(), targets)?;
            file.contents = prefixed.into_bytes();
            Ok(file)
        })?
        .dest(&dest)?;

    if config.production {
        production_bundle(compiled, &styles.bundle, styles.hash, |text, name| {
            let (code, map) = css::minify_with_map(text, name, targets)?;
            Ok((code, Some(map)))
        })?
        .dest(&dest)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::utils::fs::write_file;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let sass = dir.path().join("src/assets/styles/sass");
        write_file(&sass.join("_vars.scss"), b"$gap: 4px;").unwrap();
        write_file(&sass.join("main.scss"), b"@import 'vars';\n.a { .b { margin: $gap; } }").unwrap();
        write_file(&sass.join("pages/home.scss"), b".home { user-select: none; }").unwrap();
        dir
    }

    fn css_dir(root: &Path) -> PathBuf {
        root.join("dist/assets/css")
    }

    #[test]
    fn test_development_output() {
        let dir = project();
        run(&TaskContext::new(test_config_at(dir.path()))).unwrap();

        let out = css_dir(dir.path());
        let main = fs::read_to_string(out.join("main.css")).unwrap();
        assert!(main.contains(".a .b {\n  margin: 4px;\n}"));
        assert!(out.join("pages/home.css").exists());
        assert!(!out.join("_vars.css").exists());
        assert!(!out.join("styles.min.css").exists());
        assert!(!out.join("styles.min.css.map").exists());
    }

    #[test]
    fn test_vendor_prefixes_added() {
        let dir = project();
        run(&TaskContext::new(test_config_at(dir.path()))).unwrap();
        let home = fs::read_to_string(css_dir(dir.path()).join("pages/home.css")).unwrap();
        assert!(home.contains("-webkit-user-select"));
    }

    #[test]
    fn test_production_bundle() {
        let dir = project();
        let mut config = test_config_at(dir.path());
        config.production = true;
        run(&TaskContext::new(config)).unwrap();

        let out = css_dir(dir.path());
        assert!(out.join("main.css").exists());
        let bundle = fs::read_to_string(out.join("styles.min.css")).unwrap();
        assert!(bundle.contains(".a .b{margin:4px}"));
        assert!(bundle.ends_with("/*# sourceMappingURL=styles.min.css.map */\n"));

        let map: serde_json::Value =
            serde_json::from_slice(&fs::read(out.join("styles.min.css.map")).unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        let sources: Vec<&str> = map["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["map"]["sources"][0].as_str().unwrap())
            .collect();
        assert_eq!(sources.len(), 2);
        assert!(sources[0].ends_with("main.css"));
        assert!(sources[1].ends_with("pages/home.css"));
    }

    #[test]
    fn test_sass_error_drops_only_that_file() {
        let dir = project();
        write_file(&dir.path().join("src/assets/styles/sass/broken.scss"), b".x { color: ").unwrap();
        run(&TaskContext::new(test_config_at(dir.path()))).unwrap();

        let out = css_dir(dir.path());
        assert!(out.join("main.css").exists());
        assert!(!out.join("broken.css").exists());
    }
}
