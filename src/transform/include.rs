//! `@@include` expansion for HTML partials.
//!
//! ```html
//! @@include('template/header.html')
//! @@include("template/card.html", { "title": "Team", "meta": { "year": 2024 } })
//! ```
//!
//! Include paths resolve against the directory of the file containing the
//! directive. An included file sees the context passed to it merged over
//! its parent's, and can reference values as `@@title` or `@@meta.year`.
//! Unknown keys are left as they are.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::utils::path::normalize_path;

const DIRECTIVE: &str = "@@include(";

/// Deepest include chain accepted before giving up.
pub const MAX_DEPTH: usize = 32;

static RE_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@@([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)").unwrap());

type Vars = Map<String, Value>;

/// Expand every include directive in `source`, which was read from `path`.
pub fn expand_includes(path: &Path, source: &str) -> Result<String> {
    let mut stack = vec![normalize_path(path)];
    expand(source, path, &Vars::new(), &mut stack)
}

fn expand(source: &str, file: &Path, context: &Vars, stack: &mut Vec<PathBuf>) -> Result<String> {
    let source = substitute(source, context);
    let dir = file.parent().unwrap_or(Path::new(""));

    let mut out = String::with_capacity(source.len());
    let mut rest = source.as_str();
    while let Some(pos) = rest.find(DIRECTIVE) {
        out.push_str(&rest[..pos]);
        let args = &rest[pos + DIRECTIVE.len()..];
        let (directive, consumed) = parse_directive(args)
            .with_context(|| format!("malformed include in {}", file.display()))?;

        let target = dir.join(&directive.path);
        let key = normalize_path(&target);
        if stack.contains(&key) {
            bail!(
                "include cycle: {} includes {} again",
                file.display(),
                directive.path
            );
        }
        if stack.len() > MAX_DEPTH {
            bail!("includes nested deeper than {MAX_DEPTH} at {}", target.display());
        }

        let content = fs::read_to_string(&target).with_context(|| {
            format!("{} includes missing file {}", file.display(), directive.path)
        })?;

        let mut merged = context.clone();
        merged.extend(directive.context);

        stack.push(key);
        let expanded = expand(&content, &target, &merged, stack)?;
        stack.pop();

        out.push_str(&expanded);
        rest = &args[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

#[derive(Debug, PartialEq)]
struct Directive {
    path: String,
    context: Vars,
}

/// Parse the arguments following `@@include(` up to and including `)`.
///
/// Returns the directive and the number of bytes consumed.
fn parse_directive(args: &str) -> Result<(Directive, usize)> {
    let mut pos = skip_ws(args, 0);
    let quote = match args[pos..].chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => bail!("expected a quoted path"),
    };
    pos += 1;
    let len = args[pos..]
        .find(quote)
        .context("unterminated include path")?;
    let path = args[pos..pos + len].to_string();
    pos = skip_ws(args, pos + len + 1);

    let mut context = Vars::new();
    if args[pos..].starts_with(',') {
        pos = skip_ws(args, pos + 1);
        let mut stream = serde_json::Deserializer::from_str(&args[pos..]).into_iter::<Vars>();
        context = stream
            .next()
            .context("expected a JSON object after the include path")?
            .context("invalid include context")?;
        pos = skip_ws(args, pos + stream.byte_offset());
    }

    if !args[pos..].starts_with(')') {
        bail!("expected `)` after include arguments");
    }
    if path.is_empty() {
        bail!("empty include path");
    }
    Ok((Directive { path, context }, pos + 1))
}

fn skip_ws(s: &str, from: usize) -> usize {
    from + s[from..].len() - s[from..].trim_start().len()
}

/// Replace `@@key` and `@@a.b` with values from `context`.
fn substitute(source: &str, context: &Vars) -> String {
    if context.is_empty() {
        return source.to_string();
    }
    RE_VARIABLE
        .replace_all(source, |caps: &Captures| {
            let full = &caps[0];
            lookup(context, &caps[1]).map_or_else(|| full.to_string(), render_value)
        })
        .into_owned()
}

fn lookup<'a>(context: &'a Vars, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut value = context.get(parts.next()?)?;
    for part in parts {
        value = value.get(part)?;
    }
    Some(value)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fs::write_file;
    use tempfile::TempDir;

    fn expand_file(root: &Path, rel: &str) -> Result<String> {
        let path = root.join(rel);
        let source = fs::read_to_string(&path).unwrap();
        expand_includes(&path, &source)
    }

    #[test]
    fn test_parse_directive_plain() {
        let (d, used) = parse_directive("'header.html') rest").unwrap();
        assert_eq!(d.path, "header.html");
        assert!(d.context.is_empty());
        assert_eq!(used, "'header.html')".len());
    }

    #[test]
    fn test_parse_directive_with_context() {
        let args = r#""card.html", { "title": "A (b)", "n": 2 } )<p>"#;
        let (d, used) = parse_directive(args).unwrap();
        assert_eq!(d.path, "card.html");
        assert_eq!(d.context["title"], "A (b)");
        assert_eq!(&args[used..], "<p>");
    }

    #[test]
    fn test_parse_directive_errors() {
        assert!(parse_directive("header.html)").is_err());
        assert!(parse_directive("'header.html'").is_err());
        assert!(parse_directive("'a.html', {bad})").is_err());
        assert!(parse_directive("'')").is_err());
    }

    #[test]
    fn test_relative_to_including_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("src/template/header.html"), b"<h1>@@title</h1>").unwrap();
        write_file(
            &root.join("src/blog/post.html"),
            br#"<body>@@include('../template/header.html', {"title": "Post"})</body>"#,
        )
        .unwrap();

        let html = expand_file(root, "src/blog/post.html").unwrap();
        assert_eq!(html, "<body><h1>Post</h1></body>");
    }

    #[test]
    fn test_nested_includes_inherit_context() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("outer.html"), br#"[@@include("inner.html", {"who": "world"})]"#).unwrap();
        write_file(&root.join("inner.html"), b"@@include('leaf.html')").unwrap();
        write_file(&root.join("leaf.html"), b"hello @@who, @@missing").unwrap();

        let html = expand_file(root, "outer.html").unwrap();
        assert_eq!(html, "[hello world, @@missing]");
    }

    #[test]
    fn test_dotted_and_non_string_values() {
        let mut context = Vars::new();
        context.insert("meta".into(), serde_json::json!({ "year": 2024, "tags": ["a"] }));
        assert_eq!(
            substitute("@@meta.year @@meta.tags @@meta.nope.", &context),
            "2024 [\"a\"] @@meta.nope."
        );
    }

    #[test]
    fn test_variable_names_are_ascii_words() {
        let mut context = Vars::new();
        context.insert("col_2".into(), Value::from("wide"));
        context.insert("é".into(), Value::from("accent"));
        assert!(RE_VARIABLE.is_match("@@col_2"));
        assert_eq!(substitute("@@col_2 @@col_2x @@é", &context), "wide @@col_2x @@é");
    }

    #[test]
    fn test_top_level_markers_untouched() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("a.html"), b"mail@@example and @@@@").unwrap();
        assert_eq!(expand_file(dir.path(), "a.html").unwrap(), "mail@@example and @@@@");
    }

    #[test]
    fn test_cycle_is_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write_file(&root.join("a.html"), b"@@include('b.html')").unwrap();
        write_file(&root.join("b.html"), b"@@include('./a.html')").unwrap();

        let err = expand_file(root, "a.html").unwrap_err();
        assert!(format!("{err:#}").contains("cycle"));
    }

    #[test]
    fn test_depth_limit() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for i in 0..=MAX_DEPTH + 1 {
            let body = format!("@@include('{}.html')", i + 1);
            write_file(&root.join(format!("{i}.html")), body.as_bytes()).unwrap();
        }
        let err = expand_file(root, "0.html").unwrap_err();
        assert!(format!("{err:#}").contains("nested deeper"));
    }

    #[test]
    fn test_missing_include_is_error() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("a.html"), b"@@include('nope.html')").unwrap();
        let err = expand_file(dir.path(), "a.html").unwrap_err();
        assert!(format!("{err:#}").contains("nope.html"));
    }
}
