//! Runtime module resolution.
//!
//! Transformed modules import the rendering runtime from one of three
//! places depending on [`RuntimeMode`]:
//!
//! - `node-modules` - the installed package, addressed relative to each output file
//! - `local` - a bundled copy written beside the build output
//! - `cdn` - a remote ES module URL

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};

use crate::error::WriteError;
use crate::rewrite::RUNTIME_PACKAGE;
use crate::writer::OutputWriter;

/// Runtime version used for CDN imports unless overridden.
pub const DEFAULT_CDN_VERSION: &str = "3.3.8";

/// Output-relative location of the bundled runtime in local mode.
pub const LOCAL_RUNTIME_PATH: &str = "_neutronium/runtime.js";

#[derive(RustEmbed)]
#[folder = "assets/runtime"]
struct RuntimeAssets;

/// Where transformed modules load the runtime from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeMode {
    /// `<root>/node_modules/neutronium/src/index.js`
    #[default]
    NodeModules,
    /// Bundled copy inside the output directory
    Local,
    /// `https://esm.sh/neutronium@<version>/es2022/neutronium.mjs`
    Cdn,
}

impl RuntimeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeModules => "node-modules",
            Self::Local => "local",
            Self::Cdn => "cdn",
        }
    }
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the runtime import specifier for each output file.
#[derive(Debug, Clone)]
pub struct RuntimeLocator {
    mode: RuntimeMode,
    project_root: PathBuf,
    out_dir: PathBuf,
    cdn_version: String,
}

impl RuntimeLocator {
    pub fn new(
        mode: RuntimeMode,
        project_root: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        cdn_version: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            project_root: project_root.into().clean(),
            out_dir: out_dir.into().clean(),
            cdn_version: cdn_version.into(),
        }
    }

    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    pub fn cdn_url(&self) -> String {
        format!(
            "https://esm.sh/{RUNTIME_PACKAGE}@{}/es2022/{RUNTIME_PACKAGE}.mjs",
            self.cdn_version
        )
    }

    /// Specifier to use inside the output file at `output_relative`.
    pub fn specifier_for(&self, output_relative: &Path) -> String {
        let target = match self.mode {
            RuntimeMode::Cdn => return self.cdn_url(),
            RuntimeMode::NodeModules => self
                .project_root
                .join("node_modules")
                .join(RUNTIME_PACKAGE)
                .join("src")
                .join("index.js"),
            RuntimeMode::Local => self.out_dir.join(LOCAL_RUNTIME_PATH),
        };

        let output = self.out_dir.join(output_relative);
        let from_dir = output.parent().unwrap_or(&self.out_dir);
        relative_specifier(from_dir, &target)
    }

    /// Write the bundled runtime when running in local mode.
    ///
    /// Returns the written path, or `None` for the other modes.
    pub fn install(&self, writer: &OutputWriter) -> Result<Option<PathBuf>, WriteError> {
        if self.mode != RuntimeMode::Local {
            return Ok(None);
        }
        let written = writer.write(Path::new(LOCAL_RUNTIME_PATH), bundled_runtime().as_ref())?;
        Ok(Some(written))
    }
}

/// Source of the bundled runtime module.
pub fn bundled_runtime() -> Cow<'static, [u8]> {
    RuntimeAssets::get("neutronium.js")
        .map(|file| file.data)
        .unwrap_or(Cow::Borrowed(&[]))
}

/// ES module specifier for `target` as seen from a module in `from_dir`.
///
/// Always `/`-separated and always starts with `./` or `../`.
pub fn relative_specifier(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = target.components().collect();

    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in shared..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[shared..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locator(mode: RuntimeMode) -> RuntimeLocator {
        RuntimeLocator::new(mode, "/project", "/project/dist", DEFAULT_CDN_VERSION)
    }

    #[test]
    fn test_node_modules_specifier_from_output_root() {
        assert_eq!(
            locator(RuntimeMode::NodeModules).specifier_for(Path::new("App.js")),
            "../node_modules/neutronium/src/index.js"
        );
    }

    #[test]
    fn test_node_modules_specifier_from_nested_output() {
        assert_eq!(
            locator(RuntimeMode::NodeModules).specifier_for(Path::new("components/ui/Button.js")),
            "../../../node_modules/neutronium/src/index.js"
        );
    }

    #[test]
    fn test_local_specifier() {
        let locator = locator(RuntimeMode::Local);
        assert_eq!(
            locator.specifier_for(Path::new("App.js")),
            "./_neutronium/runtime.js"
        );
        assert_eq!(
            locator.specifier_for(Path::new("components/Header.js")),
            "../_neutronium/runtime.js"
        );
    }

    #[test]
    fn test_node_modules_specifier_with_out_dir_outside_root() {
        let locator = RuntimeLocator::new(
            RuntimeMode::NodeModules,
            "/work/project",
            "/work/project/../build",
            DEFAULT_CDN_VERSION,
        );
        assert_eq!(
            locator.specifier_for(Path::new("App.js")),
            "../project/node_modules/neutronium/src/index.js"
        );
        assert_eq!(
            locator.specifier_for(Path::new("components/Header.js")),
            "../../project/node_modules/neutronium/src/index.js"
        );
    }

    #[test]
    fn test_cdn_specifier_uses_version() {
        assert_eq!(
            locator(RuntimeMode::Cdn).specifier_for(Path::new("App.js")),
            "https://esm.sh/neutronium@3.3.8/es2022/neutronium.mjs"
        );
        let pinned = RuntimeLocator::new(RuntimeMode::Cdn, "/p", "/p/dist", "4.0.0");
        assert!(pinned.cdn_url().contains("neutronium@4.0.0"));
    }

    #[test]
    fn test_install_writes_bundle_only_in_local_mode() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path());

        assert!(locator(RuntimeMode::NodeModules).install(&writer).unwrap().is_none());

        let written = locator(RuntimeMode::Local).install(&writer).unwrap().unwrap();
        let content = std::fs::read_to_string(written).unwrap();
        assert!(content.contains("export function createApp"));
    }

    #[test]
    fn test_mode_serde_names() {
        let mode: RuntimeMode = serde_json::from_str("\"node-modules\"").unwrap();
        assert_eq!(mode, RuntimeMode::NodeModules);
        assert_eq!(RuntimeMode::Cdn.to_string(), "cdn");
    }
}
