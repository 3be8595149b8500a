//! Walks the dataset tree and keeps the files that pass the name filters.

use crate::error::{Result, ShuffleError};
use regex::Regex;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
    /// Extension including the leading dot, empty when there is none.
    pub ext: String,
}

impl FileEntry {
    fn new(path: PathBuf, size: u64) -> Self {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self { path, size, ext }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub entries: Vec<FileEntry>,
    pub total_bytes: u64,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Basename filters: prefix anchored at the start, suffix at the end.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    prefix: Option<Regex>,
    suffix: Option<Regex>,
}

impl NameFilter {
    pub fn new(prefix: Option<&str>, suffix: Option<&str>) -> Result<Self> {
        Ok(Self {
            prefix: compile(prefix, |p| format!("^(?:{p})"))?,
            suffix: compile(suffix, |s| format!("(?:{s})$"))?,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let pre = self.prefix.as_ref().map_or(true, |r| r.is_match(file_name));
        let suf = self.suffix.as_ref().map_or(true, |r| r.is_match(file_name));
        pre && suf
    }
}

fn compile(pattern: Option<&str>, anchor: impl Fn(&str) -> String) -> Result<Option<Regex>> {
    match pattern.filter(|p| !p.is_empty()) {
        None => Ok(None),
        Some(p) => Regex::new(&anchor(p))
            .map(Some)
            .map_err(|e| ShuffleError::Config(format!("invalid pattern {p:?}: {e}"))),
    }
}

/// Canonical paths the walk must not enter or collect, e.g. the run's own outputs.
#[derive(Debug, Clone, Default)]
pub struct SkipSet(Vec<PathBuf>);

impl SkipSet {
    /// Keeps the canonical form of each path that exists; missing paths are dropped.
    pub fn new<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        Self(
            paths
                .into_iter()
                .filter_map(|p| p.canonicalize().ok())
                .collect(),
        )
    }

    fn contains(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name();
        if !self.0.iter().any(|p| p.file_name() == Some(name)) {
            return false;
        }
        entry
            .path()
            .canonicalize()
            .map_or(false, |c| self.0.contains(&c))
    }
}

/// Collects every file under `root` whose basename passes `filter`, in traversal
/// order. Anything below a dot-prefixed component (relative to `root`) or listed
/// in `skip` is left out.
pub fn scan(root: &Path, filter: &NameFilter, skip: &SkipSet) -> Result<ScanResult> {
    let mut result = ScanResult::default();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            !is_hidden(e.path().strip_prefix(root).unwrap_or(e.path())) && !skip.contains(e)
        });
    for entry in walker {
        let entry = entry.map_err(|err| walk_error(root, err))?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !filter.matches(&name) {
            continue;
        }
        let meta = entry.metadata().map_err(|err| walk_error(path, err))?;
        result.total_bytes += meta.len();
        result.entries.push(FileEntry::new(path.to_path_buf(), meta.len()));
    }
    debug!(
        files = result.entries.len(),
        bytes = result.total_bytes,
        "scan finished"
    );
    Ok(result)
}

fn walk_error(fallback: &Path, err: walkdir::Error) -> ShuffleError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| fallback.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop detected"));
    ShuffleError::Filesystem { path, source }
}

/// True if any normal component of `path` starts with a dot.
fn is_hidden(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}
