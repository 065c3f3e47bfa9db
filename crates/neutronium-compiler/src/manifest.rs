//! Project manifest (`package.json`) loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ManifestError;

/// File name of the manifest at the project root.
pub const MANIFEST_FILE: &str = "package.json";

/// Entry used when the manifest has no `main` field.
pub const DEFAULT_ENTRY: &str = "App.js";

/// Document title used when the manifest has no `name` field.
pub const DEFAULT_TITLE: &str = "Neutronium App";

/// The subset of `package.json` the build pipeline reads.
///
/// Re-read on every build pass; never written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub name: Option<String>,

    /// Entry module, relative to the project root.
    #[serde(default)]
    pub main: Option<String>,

    /// Favicon path, relative to the project root.
    #[serde(default)]
    pub favicon: Option<String>,

    /// Script hints. Read so malformed manifests fail early, otherwise unused.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl ProjectManifest {
    /// Load `package.json` from `root`.
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(ManifestError::Missing(root.to_path_buf()));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;

        Self::parse(&content).map_err(|source| ManifestError::Parse { path, source })
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Declared entry, normalized to a root-relative path.
    pub fn entry(&self) -> PathBuf {
        let main = self
            .main
            .as_deref()
            .map(str::trim)
            .filter(|main| !main.is_empty())
            .unwrap_or(DEFAULT_ENTRY);
        normalize_relative(main)
    }

    /// Entry exactly as written in the manifest, for messages.
    pub fn entry_label(&self) -> &str {
        self.main.as_deref().unwrap_or(DEFAULT_ENTRY)
    }

    pub fn title(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_TITLE)
    }

    /// Absolute favicon path when one is declared.
    pub fn favicon_path(&self, root: &Path) -> Option<PathBuf> {
        self.favicon
            .as_deref()
            .map(str::trim)
            .filter(|favicon| !favicon.is_empty())
            .map(|favicon| root.join(normalize_relative(favicon)))
    }
}

fn normalize_relative(path: &str) -> PathBuf {
    let trimmed = path.trim_start_matches("./").trim_start_matches('/');
    trimmed.split('/').filter(|part| !part.is_empty() && *part != ".").collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_fields_missing() {
        let manifest = ProjectManifest::parse("{}").unwrap();
        assert_eq!(manifest.entry(), PathBuf::from("App.js"));
        assert_eq!(manifest.title(), DEFAULT_TITLE);
        assert!(manifest.favicon_path(Path::new("/project")).is_none());
    }

    #[test]
    fn test_entry_is_normalized() {
        let manifest = ProjectManifest::parse(r#"{"main": "./src/App.jsx"}"#).unwrap();
        assert_eq!(manifest.entry(), PathBuf::from("src").join("App.jsx"));
        assert_eq!(manifest.entry_label(), "./src/App.jsx");
    }

    #[test]
    fn test_favicon_resolves_against_root() {
        let manifest =
            ProjectManifest::parse(r#"{"name": "demo", "favicon": "public/icon.png"}"#).unwrap();
        assert_eq!(
            manifest.favicon_path(Path::new("/project")),
            Some(Path::new("/project").join("public").join("icon.png"))
        );
        assert_eq!(manifest.title(), "demo");
    }

    #[test]
    fn test_scripts_are_accepted() {
        let manifest = ProjectManifest::parse(
            r#"{"main": "App.js", "scripts": {"start": "neutronium start --watch"}}"#,
        )
        .unwrap();
        assert_eq!(manifest.scripts.len(), 1);
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = ProjectManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Missing(_)));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        let err = ProjectManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }
}
