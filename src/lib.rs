//! Compiler for Webflow markup (`.webf`) to HTML.
//!
//! ```text
//! import Card from "components/card.webf";
//!
//! main:
//!     h1: classes:{title} content:{Hello};
//!     Card:;
//! ;
//! ```
//!
//! Pipeline: [`parser::tokenize`] → [`parser::TreeBuilder`] → [`resolve`]
//! (recursive compilation of imports into a [`ComponentCache`]) →
//! [`generate::HtmlGenerator`].

pub mod ast;
pub mod error;
pub mod generate;
pub mod parser;
pub mod resolve;

pub use error::{CompileError, ErrorKind, SyntaxReason};
pub use resolve::{ComponentCache, FsLoader, Loader, MemoryLoader};

use serde::Serialize;
use std::path::Path;

/// Result of compiling a root file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileOutput {
    pub html: String,
    /// Names of every component resolved along the way, sorted
    pub components: Vec<String>,
}

/// Compile source text, resolving imports against `base_dir` on the local file system.
pub fn compile(
    source: &str,
    base_dir: impl AsRef<Path>,
    cache: &mut ComponentCache,
) -> Result<String, CompileError> {
    compile_with(&FsLoader, source, base_dir.as_ref(), cache)
}

/// Compile source text, loading imports through `loader`.
pub fn compile_with<L: Loader + ?Sized>(
    loader: &L,
    source: &str,
    base_dir: &Path,
    cache: &mut ComponentCache,
) -> Result<String, CompileError> {
    resolve::compile_source(loader, source, base_dir, cache)
}

/// Compile a root file with a fresh cache.
///
/// The root file counts as in progress, so a component that imports it back
/// fails with [`CompileError::CyclicImport`].
pub fn compile_file<L: Loader + ?Sized>(loader: &L, path: &Path) -> Result<CompileOutput, CompileError> {
    let path = resolve::resolve_path(Path::new(""), path);
    let source = loader.read_text(&path).map_err(|err| CompileError::Read {
        path: path.clone(),
        message: err.to_string(),
    })?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut cache = ComponentCache::new();
    cache.enter(path);
    let html = compile_with(loader, &source, &base_dir, &mut cache)?;

    Ok(CompileOutput {
        html,
        components: cache.names(),
    })
}
