//! Source discovery.
//!
//! A build pass starts by listing every recognized source file under the
//! project root. Nothing is cached between passes.

use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// File extensions that are transformed and watched.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "ts", "tsx"];

/// Directory names never searched for sources.
pub const IGNORED_DIRS: &[&str] = &["node_modules", ".git"];

/// Whether `path` names a file the compiler should transform.
///
/// Type declaration files (`.d.ts`) are excluded.
pub fn is_recognized(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    if !SOURCE_EXTENSIONS.contains(&ext) {
        return false;
    }
    !path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".d.ts"))
}

/// A recognized source file found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the project root.
    pub relative: PathBuf,
}

impl SourceFile {
    /// Output path relative to the build-output root.
    pub fn output_relative(&self) -> PathBuf {
        output_relative(&self.relative)
    }
}

/// Map a root-relative source path to its root-relative output path.
pub fn output_relative(relative: &Path) -> PathBuf {
    relative.with_extension("js")
}

/// List recognized sources under `root`, sorted by relative path.
///
/// Skips `node_modules`, `.git`, hidden directories and `out_dir`.
/// Unreadable entries are logged and skipped.
pub fn discover_sources(root: &Path, out_dir: &Path) -> Vec<SourceFile> {
    let mut sources = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry, root, out_dir));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Skipping unreadable path during discovery: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_recognized(entry.path()) {
            continue;
        }

        if let Ok(relative) = entry.path().strip_prefix(root) {
            sources.push(SourceFile {
                path: entry.path().to_path_buf(),
                relative: relative.to_path_buf(),
            });
        }
    }

    sources.sort_by(|a, b| a.relative.cmp(&b.relative));
    sources
}

fn is_excluded_dir(entry: &DirEntry, root: &Path, out_dir: &Path) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    if entry.path() == out_dir {
        return true;
    }
    let Ok(relative) = entry.path().strip_prefix(root) else {
        return true;
    };
    relative.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .is_some_and(|name| name.starts_with('.') || IGNORED_DIRS.contains(&name)),
        _ => false,
    })
}
