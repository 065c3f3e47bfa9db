//! Configuration for `neutronium start`.
//!
//! Merges settings from CLI args, environment variables, and a config file.
//! Priority: CLI > Environment > `neutronium.config.json` > Defaults

mod defaults;
mod loading;
mod validation;

use std::path::{Path, PathBuf};
use std::time::Duration;

use neutronium_compiler::{BuildOptions, RuntimeMode, TransformerOptions, TypeCheck};
use path_clean::PathClean;
use serde::{Deserialize, Serialize};

pub use defaults::*;
pub use loading::{CONFIG_FILE, CliOverrides, ENV_PREFIX};

/// Neutronium configuration - loaded from neutronium.config.json or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NeutroniumConfig {
    /// Output directory, relative to the project root
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Dev server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Dev server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Where compiled modules import the runtime from
    #[serde(default)]
    pub runtime: RuntimeMode,

    /// Runtime version for CDN imports
    #[serde(default = "default_cdn_version")]
    pub cdn_version: String,

    /// Debounce window for rebuilds, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Run the type-check when tsconfig.json exists
    #[serde(default = "default_true")]
    pub type_check: bool,

    /// Type-check command as an argv list
    #[serde(default = "default_type_check_command")]
    pub type_check_command: Vec<String>,

    /// JSX element factory
    #[serde(default = "default_pragma")]
    pub pragma: String,

    /// JSX fragment factory
    #[serde(default = "default_pragma_frag")]
    pub pragma_frag: String,

    /// Append `createApp(App).mount("#app")` to the entry module
    #[serde(default = "default_true")]
    pub auto_mount: bool,

    /// Remove the output directory before each build
    #[serde(default)]
    pub clean: bool,

    /// Open the browser when the dev server starts
    #[serde(default)]
    pub open: bool,
}

impl Default for NeutroniumConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            port: default_port(),
            host: default_host(),
            runtime: RuntimeMode::default(),
            cdn_version: default_cdn_version(),
            debounce_ms: default_debounce_ms(),
            type_check: true,
            type_check_command: default_type_check_command(),
            pragma: default_pragma(),
            pragma_frag: default_pragma_frag(),
            auto_mount: true,
            clean: false,
            open: false,
        }
    }
}

impl NeutroniumConfig {
    /// Compiler options for a project rooted at `root`.
    pub fn build_options(&self, root: &Path, live_reload: bool) -> BuildOptions {
        BuildOptions {
            project_root: root.to_path_buf(),
            out_dir: self.out_dir.clone(),
            runtime: self.runtime,
            cdn_version: self.cdn_version.clone(),
            transformer: TransformerOptions {
                pragma: self.pragma.clone(),
                pragma_frag: self.pragma_frag.clone(),
                auto_mount: self.auto_mount,
            },
            type_check: if self.type_check {
                TypeCheck::from_argv(&self.type_check_command)
            } else {
                None
            },
            clean: self.clean,
            live_reload,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Absolute output directory for a project rooted at `root`.
    pub fn out_dir_path(&self, root: &Path) -> PathBuf {
        if self.out_dir.is_absolute() {
            self.out_dir.clean()
        } else {
            root.join(&self.out_dir).clean()
        }
    }
}
