use neutronium_compiler::TypeCheck;
use neutronium_compiler::transform::pragma_namespace;

use crate::cli::{parse_debounce, parse_pragma};
use crate::config::NeutroniumConfig;
use crate::error::{ConfigError, Result};

impl NeutroniumConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "Use a port between 1 and 65535".to_string(),
            }
            .into());
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                value: self.host.clone(),
                hint: "Host cannot be empty (try 127.0.0.1)".to_string(),
            }
            .into());
        }

        parse_debounce(&self.debounce_ms.to_string()).map_err(|hint| ConfigError::InvalidValue {
            field: "debounceMs".to_string(),
            value: self.debounce_ms.to_string(),
            hint,
        })?;

        for (field, value) in [("pragma", &self.pragma), ("pragmaFrag", &self.pragma_frag)] {
            parse_pragma(value).map_err(|hint| ConfigError::InvalidValue {
                field: field.to_string(),
                value: value.clone(),
                hint,
            })?;
        }

        if pragma_namespace(&self.pragma) != pragma_namespace(&self.pragma_frag) {
            return Err(ConfigError::InvalidValue {
                field: "pragmaFrag".to_string(),
                value: self.pragma_frag.clone(),
                hint: format!(
                    "Fragment factory must share the '{}' namespace with pragma",
                    pragma_namespace(&self.pragma)
                ),
            }
            .into());
        }

        if self.cdn_version.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cdnVersion".to_string(),
                value: self.cdn_version.clone(),
                hint: "Use a published version such as 3.3.8".to_string(),
            }
            .into());
        }

        if self.type_check && TypeCheck::from_argv(&self.type_check_command).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "typeCheckCommand".to_string(),
                value: format!("{:?}", self.type_check_command),
                hint: "Set a command such as [\"npx\", \"tsc\", \"--noEmit\"] or disable typeCheck"
                    .to_string(),
            }
            .into());
        }

        Ok(())
    }
}
