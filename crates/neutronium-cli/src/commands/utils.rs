//! Shared utilities for command implementations.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Resolve a path relative to a working directory.
///
/// If the path is absolute, returns it unchanged. Otherwise, joins it with
/// the working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Resolve `--root` (default: the current directory) to a canonical
/// directory path.
///
/// # Errors
///
/// Returns `ConfigError::RootNotFound` if the path is not an existing
/// directory.
pub fn resolve_project_root(root: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let root = root.map_or_else(|| cwd.clone(), |root| resolve_path(root, &cwd));

    if !root.is_dir() {
        return Err(ConfigError::RootNotFound(root).into());
    }

    Ok(root.canonicalize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_path_keeps_absolute() {
        let abs = if cfg!(windows) {
            PathBuf::from("C:\\project")
        } else {
            PathBuf::from("/project")
        };
        assert_eq!(resolve_path(&abs, Path::new("/cwd")), abs);
    }

    #[test]
    fn test_resolve_path_joins_relative() {
        assert_eq!(
            resolve_path(Path::new("app"), Path::new("/cwd")),
            PathBuf::from("/cwd/app")
        );
    }

    #[test]
    fn test_resolve_project_root_canonicalizes() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_project_root(Some(dir.path())).unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = resolve_project_root(Some(&missing)).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::RootNotFound(_))
        ));
    }
}
