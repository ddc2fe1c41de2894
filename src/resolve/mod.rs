//! Import resolution and component substitution.
//!
//! Each `import Name from "path";` is compiled recursively, depth first, in
//! declaration order. The compiled HTML is stored in the [`ComponentCache`]
//! under `Name`, and the emitter substitutes it wherever `Name` is used as a
//! tag. The cache is shared by every file of one top-level compilation, so a
//! component imported twice (directly or transitively) is compiled once.

pub mod loader;

pub use loader::{FsLoader, Loader, MemoryLoader};

use crate::ast::Import;
use crate::error::CompileError;
use crate::generate::{Generator, HtmlGenerator};
use crate::parser;
use std::collections::HashMap;
use std::env;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument, trace};

/// Compiled components of one top-level compilation, keyed by import name.
#[derive(Debug, Clone, Default)]
pub struct ComponentCache {
    components: HashMap<String, String>,
    /// Files currently being compiled, outermost first
    in_progress: Vec<PathBuf>,
}

impl ComponentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.components.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Entries are write-once: returns `false` and keeps the existing HTML
    /// if `name` is already cached.
    pub fn insert(&mut self, name: impl Into<String>, html: impl Into<String>) -> bool {
        let name = name.into();
        if self.components.contains_key(&name) {
            return false;
        }
        self.components.insert(name, html.into());
        true
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Cached component names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_in_progress(&self, path: &Path) -> bool {
        self.in_progress.iter().any(|p| p == path)
    }

    pub(crate) fn enter(&mut self, path: PathBuf) {
        self.in_progress.push(path);
    }

    pub(crate) fn leave(&mut self) {
        self.in_progress.pop();
    }
}

/// Resolve `path` against `base_dir` to an absolute, lexically normalized path.
///
/// An absolute `path` replaces the base. Symlinks are not followed.
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    let joined = base_dir.join(path);
    let absolute = if joined.is_relative() {
        match env::current_dir() {
            Ok(cwd) => cwd.join(joined),
            Err(_) => joined,
        }
    } else {
        joined
    };
    normalize(&absolute)
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Compile one source file: resolve its imports into `cache`, then render its elements.
#[instrument(level = "debug", skip_all, fields(base = %base_dir.display()))]
pub fn compile_source<L: Loader + ?Sized>(
    loader: &L,
    source: &str,
    base_dir: &Path,
    cache: &mut ComponentCache,
) -> Result<String, CompileError> {
    let document = parser::parse(source)?;
    trace!(
        imports = document.imports.len(),
        elements = document.elements.len(),
        "parsed source"
    );

    for import in &document.imports {
        resolve_import(loader, import, base_dir, cache)?;
    }

    let html = HtmlGenerator::new().generate(&document.elements, cache);
    debug!(len = html.len(), "rendered");
    Ok(html)
}

fn resolve_import<L: Loader + ?Sized>(
    loader: &L,
    import: &Import,
    base_dir: &Path,
    cache: &mut ComponentCache,
) -> Result<(), CompileError> {
    if cache.contains(&import.name) {
        trace!(name = %import.name, "component cache hit");
        return Ok(());
    }

    let path = resolve_path(base_dir, Path::new(&import.path));
    if cache.is_in_progress(&path) {
        return Err(CompileError::CyclicImport {
            name: import.name.clone(),
            path,
        });
    }
    if !loader.exists(&path) {
        return Err(CompileError::ImportNotFound {
            name: import.name.clone(),
            path,
        });
    }

    let source = loader.read_text(&path).map_err(|err| CompileError::Read {
        path: path.clone(),
        message: err.to_string(),
    })?;
    let component_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    debug!(name = %import.name, path = %path.display(), "compiling component");
    cache.enter(path.clone());
    let result = compile_source(loader, &source, &component_dir, cache);
    cache.leave();

    let html = result.map_err(|err| CompileError::InImport {
        name: import.name.clone(),
        path,
        source: Box::new(err),
    })?;
    cache.insert(import.name.clone(), html);
    Ok(())
}
