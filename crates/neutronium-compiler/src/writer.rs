//! Output writer for build artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WriteError;

/// Writes artifacts beneath a fixed build-output root.
///
/// Writes are whole-file overwrites. Files are never pruned unless
/// [`OutputWriter::clean`] is called explicitly.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `relative`, creating parent directories as needed.
    ///
    /// Returns the absolute path that was written.
    pub fn write(&self, relative: &Path, content: impl AsRef<[u8]>) -> Result<PathBuf, WriteError> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        fs::write(&path, content).map_err(|source| WriteError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Create `relative` (and the output root) if missing. Idempotent.
    pub fn ensure_dir(&self, relative: &Path) -> Result<PathBuf, WriteError> {
        let path = self.root.join(relative);
        create_dir_all(&path)?;
        Ok(path)
    }

    /// Remove the output root and everything in it.
    pub fn clean(&self) -> Result<(), WriteError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(WriteError::Remove {
                path: self.root.clone(),
                source,
            }),
        }
    }
}

fn create_dir_all(path: &Path) -> Result<(), WriteError> {
    fs::create_dir_all(path).map_err(|source| WriteError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
