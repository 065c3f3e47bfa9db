//! Miette diagnostic conversion for CLI errors.

use miette::Report;
use neutronium_compiler::{BuildError, ManifestError};

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::Manifest(ManifestError::Parse { path, source }) => miette::miette!(
            "Invalid package.json at {}: {}\n\nHint: Fix the JSON syntax; the build reads \"main\" and \"favicon\" from it",
            path.display(),
            source
        ),
        BuildError::EntryNotFound { entry, root } => miette::miette!(
            "Entry file '{}' not found in {}\n\nHint: Create it or point \"main\" in package.json at an existing source file",
            entry,
            root.display()
        ),
        _ => miette::miette!("Build failed: {}", err),
    }
}
