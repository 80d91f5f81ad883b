//! `html`: expand `@@include` directives.

use anyhow::Result;

use crate::graph::TaskContext;
use crate::pipeline::{ErrorGuard, Pipeline};
use crate::transform::include::expand_includes;

pub fn run(ctx: &TaskContext) -> Result<()> {
    let config = &ctx.config;
    let dest = config.root_join(&config.html.dest);

    Pipeline::src("html", config.get_root(), &config.html.src, ErrorGuard::Plumber)?
        .pipe(|mut file| {
            let html = expand_includes(&file.path, file.text()?)?;
            file.contents = html.into_bytes();
            Ok(file)
        })?
        .dest(&dest)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::utils::fs::{collect_files, write_file};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_html_resolves_includes_and_skips_templates() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("src/template/head.html"), b"<title>@@title</title>").unwrap();
        write_file(
            &root.join("src/index.html"),
            br#"<html>@@include('template/head.html', {"title": "Home"})</html>"#,
        )
        .unwrap();
        write_file(
            &root.join("src/blog/post.html"),
            br#"@@include("../template/head.html", {"title": "Post"})"#,
        )
        .unwrap();

        run(&TaskContext::new(test_config_at(root))).unwrap();

        let out = collect_files(&root.join("dist"));
        assert_eq!(out, vec![root.join("dist/blog/post.html"), root.join("dist/index.html")]);
        for file in out {
            assert!(!fs::read_to_string(file).unwrap().contains("@@"));
        }
        assert_eq!(
            fs::read_to_string(root.join("dist/index.html")).unwrap(),
            "<html><title>Home</title></html>"
        );
    }

    #[test]
    fn test_broken_page_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("src/bad.html"), b"@@include('missing.html')").unwrap();
        write_file(&root.join("src/good.html"), b"<p>ok</p>").unwrap();

        run(&TaskContext::new(test_config_at(root))).unwrap();

        assert!(root.join("dist/good.html").exists());
        assert!(!root.join("dist/bad.html").exists());
    }
}
