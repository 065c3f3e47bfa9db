use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use neutronium_compiler::RuntimeMode;
use serde::Serialize;

use crate::cli::StartArgs;
use crate::config::NeutroniumConfig;
use crate::error::{ConfigError, Result};

/// Config file looked up at the project root.
pub const CONFIG_FILE: &str = "neutronium.config.json";

/// Prefix for environment overrides (`NEUTRONIUM_PORT=4000`).
pub const ENV_PREFIX: &str = "NEUTRONIUM_";

/// Single-word keys that may come from the environment.
const ENV_KEYS: &[&str] = &["port", "host", "runtime", "clean", "open"];

/// Values given explicitly on the command line.
///
/// Unset fields are skipped when serializing so they never mask values
/// from lower-priority sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
}

impl From<&StartArgs> for CliOverrides {
    fn from(args: &StartArgs) -> Self {
        Self {
            out_dir: args.out_dir.clone(),
            port: args.port,
            host: args.host.clone(),
            runtime: args.runtime.map(Into::into),
            debounce_ms: args.debounce,
            type_check: args.no_type_check.then_some(false),
            clean: args.clean.then_some(true),
            open: args.open.then_some(true),
        }
    }
}

impl NeutroniumConfig {
    /// Load configuration for the project at `root` and validate it.
    pub fn load(overrides: &CliOverrides, root: &Path) -> Result<Self> {
        let config: Self = Self::figment(overrides, root)
            .extract()
            .map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    fn figment(overrides: &CliOverrides, root: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = root.join(CONFIG_FILE);
        if config_file.is_file() {
            figment = figment.merge(Json::file(config_file));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).only(ENV_KEYS))
            .merge(Serialized::defaults(overrides))
    }
}
