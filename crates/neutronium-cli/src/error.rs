//! Error handling for the Neutronium CLI.
//!
//! `CliError` is the top-level type every command returns. Compiler failures
//! arrive as [`neutronium_compiler::BuildError`] and convert automatically;
//! configuration problems are described by [`ConfigError`] with a hint the
//! user can act on.
//!
//! Errors are turned into miette reports only at the very edge, in `main`.

mod report;

use std::path::PathBuf;

use thiserror::Error;

pub use neutronium_compiler::BuildError;
pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (invalid values, unreadable config file)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fatal build failure (unreadable manifest, missing entry)
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Project root passed via --root doesn't exist
    #[error("Project root not found: {}\n\nHint: Pass an existing directory to --root", .0.display())]
    RootNotFound(PathBuf),

    /// Config file could not be parsed or merged
    #[error("Failed to load configuration: {0}\n\nHint: Check neutronium.config.json and NEUTRONIUM_* environment variables")]
    Load(#[from] Box<figment::Error>),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Result type alias for CLI operations.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
