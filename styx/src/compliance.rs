//! Compliance corpus runner.
//!
//! Walks a directory of `.styx` files and renders each one as an
//! S-expression, in the exact shape the compliance harness diffs against a
//! reference implementation. The lexer and parser stay I/O-free; all file
//! access happens here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::parse;

/// Render one source string: a document sexp on success, an error sexp on
/// failure.
pub fn render_source(source: &str) -> String {
    match parse(source) {
        Ok(doc) => doc.to_sexp(),
        Err(err) => err.to_sexp(),
    }
}

/// Walk `corpus_root` for `.styx` files (recursive, sorted) and render each
/// under a `; file: <rel-path>` header, joining files with `\n`.
pub fn run_corpus(corpus_root: &Path) -> io::Result<String> {
    let mut files = Vec::new();
    collect_styx_files(corpus_root, &mut files)?;
    files.sort();

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let source = fs::read_to_string(&path)?;
        let name = display_name(corpus_root, &path);
        results.push(format!("; file: {name}\n{}", render_source(&source)));
    }
    Ok(results.join("\n"))
}

fn collect_styx_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_styx_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "styx") {
            out.push(path);
        }
    }
    Ok(())
}

/// Header path in the `<root-parent>/<root>/<relative>` form the harness
/// expects.
fn display_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut parts = Vec::new();
    if let Some(parent) = root.parent().and_then(|p| p.file_name()) {
        parts.push(parent.to_string_lossy().into_owned());
    }
    if let Some(name) = root.file_name() {
        parts.push(name.to_string_lossy().into_owned());
    }
    parts.push(rel.to_string_lossy().into_owned());
    parts.join("/")
}
