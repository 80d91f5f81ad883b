//! JavaScript formatting and minification using oxc.

use std::path::PathBuf;

use anyhow::{Result, bail};
use oxc::allocator::Allocator;
use oxc::ast::ast::Program;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Parse `source`, failing with every syntax error found.
fn parse<'a>(allocator: &'a Allocator, source: &'a str) -> Result<Program<'a>> {
    let ret = Parser::new(allocator, source, SourceType::unambiguous()).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        bail!("{}", messages.join("\n"));
    }
    if ret.panicked {
        bail!("parser gave up");
    }
    Ok(ret.program)
}

/// Pretty-print with `indent` spaces per level.
pub fn format(source: &str, indent: usize) -> Result<String> {
    let allocator = Allocator::default();
    let program = parse(&allocator, source)?;
    let code = Codegen::new().build(&program).code;
    Ok(reindent(&code, indent))
}

/// Minify (mangle + compress), returning the code and, when
/// `source_name` is given, a source map pointing at it.
pub fn minify(source: &str, source_name: Option<&str>) -> Result<(String, Option<String>)> {
    let allocator = Allocator::default();
    let mut program = parse(&allocator, source)?;

    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);

    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: source_name.map(PathBuf::from),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);

    let map = output.map.map(|map| map.to_json_string());
    Ok((output.code, map))
}

/// Replace leading tabs with `indent` spaces.
fn reindent(code: &str, indent: usize) -> String {
    let unit = " ".repeat(indent);
    let mut out = String::with_capacity(code.len());
    for line in code.split_inclusive('\n') {
        let body = line.trim_start_matches('\t');
        let depth = line.len() - body.len();
        for _ in 0..depth {
            out.push_str(&unit);
        }
        out.push_str(body);
    }
    out
}
