//! Filesystem watcher for watch sessions.
//!
//! Watches the whole project root recursively and forwards only qualifying
//! changes: recognized sources plus `package.json` and `tsconfig.json`.
//! Everything under `node_modules`, `.git`, hidden directories or the output
//! directory is dropped here, before it can reach the debouncer.

use std::path::{Component, Path, PathBuf};

use neutronium_compiler::{MANIFEST_FILE, TSCONFIG_FILE, is_recognized};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::CONFIG_FILE;
use crate::error::{ConfigError, Result};

const CHANNEL_CAPACITY: usize = 256;

/// A qualifying filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Added(PathBuf),
    Changed(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            Self::Added(p) | Self::Changed(p) | Self::Removed(p) => p,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Changed(_) => "changed",
            Self::Removed(_) => "removed",
        }
    }
}

/// Decides which paths may trigger a rebuild.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    root: PathBuf,
    out_dir: PathBuf,
}

impl ChangeFilter {
    pub fn new(root: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            out_dir: out_dir.into(),
        }
    }

    pub fn qualifies(&self, path: &Path) -> bool {
        if path.starts_with(&self.out_dir) {
            return false;
        }
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };

        let hidden_or_ignored = relative.components().any(|component| match component {
            Component::Normal(name) => name.to_str().is_some_and(|name| {
                name.starts_with('.') || name == "node_modules"
            }),
            _ => false,
        });
        if hidden_or_ignored {
            return false;
        }

        // The CLI's own config file never triggers a rebuild.
        if relative == Path::new(CONFIG_FILE) {
            return false;
        }

        if relative == Path::new(MANIFEST_FILE) || relative == Path::new(TSCONFIG_FILE) {
            return true;
        }

        is_recognized(relative)
    }

    /// Map a raw notify event to qualifying changes.
    pub fn classify(&self, event: &Event) -> Vec<FileChange> {
        let mut changes = Vec::new();

        for (index, path) in event.paths.iter().enumerate() {
            if !self.qualifies(path) {
                continue;
            }
            let path = path.clone();
            let change = match event.kind {
                EventKind::Create(_) => FileChange::Added(path),
                EventKind::Remove(_) => FileChange::Removed(path),
                EventKind::Modify(ModifyKind::Name(RenameMode::From)) => FileChange::Removed(path),
                EventKind::Modify(ModifyKind::Name(RenameMode::To)) => FileChange::Added(path),
                // Both paths in one event: old name first, new name second.
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if index == 0 => {
                    FileChange::Removed(path)
                }
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => FileChange::Added(path),
                EventKind::Modify(_) => FileChange::Changed(path),
                _ => continue,
            };
            changes.push(change);
        }

        changes
    }
}

/// Recursive watch over a project root.
///
/// Dropping the watcher releases the OS subscription and closes the
/// change channel.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    pub fn new(filter: ChangeFilter) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        let root = filter.root.clone();
        if !root.is_dir() {
            return Err(ConfigError::RootNotFound(root).into());
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    for change in filter.classify(&event) {
                        tracing::debug!("{} {}", change.label(), change.path().display());
                        if tx.blocking_send(change).is_err() {
                            // Receiver gone: the session is shutting down.
                            return;
                        }
                    }
                }
                Err(err) => tracing::warn!("File watcher error: {}", err),
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
