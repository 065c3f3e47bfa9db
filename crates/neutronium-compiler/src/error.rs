//! Error types for the Neutronium compiler.
//!
//! Errors are split along the same lines as the build pipeline:
//!
//! - [`TransformError`] - a single source file could not be lowered
//! - [`WriteError`] - an artifact could not be written to the output directory
//! - [`ManifestError`] - `package.json` is missing or malformed
//! - [`BuildError`] - a failure that aborts the whole build pass
//!
//! Only [`BuildError`] ever escapes [`crate::Builder::build`]. Per-file
//! transform and write failures are collected into the build report instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for operations that can fail the whole build.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Failure to transform one source file.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The source text could not be parsed.
    #[error("failed to parse {}:\n{}", path.display(), diagnostics.join("\n"))]
    Parse {
        /// File that failed to parse
        path: PathBuf,
        /// Rendered parser diagnostics
        diagnostics: Vec<String>,
    },

    /// The parser succeeded but JSX lowering reported errors.
    #[error("failed to lower JSX in {}:\n{}", path.display(), diagnostics.join("\n"))]
    Lower {
        /// File that failed to lower
        path: PathBuf,
        /// Rendered transformer diagnostics
        diagnostics: Vec<String>,
    },
}

impl TransformError {
    /// Path of the file that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Parse { path, .. } | Self::Lower { path, .. } => path,
        }
    }
}

/// Failure to write a build artifact.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to load the project manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no package.json found in {}\n\nHint: run this command from the project root or pass --root", .0.display())]
    Missing(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to read one source file before transforming it.
#[derive(Debug, Error)]
#[error("failed to read {}: {source}", path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Everything that can go wrong with a single file during a build pass.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Write(#[from] WriteError),

    /// Another source already compiles to the same output path.
    #[error(
        "{} would overwrite {} (also written by {})",
        source_path.display(),
        output.display(),
        claimed_by.display()
    )]
    OutputCollision {
        source_path: PathBuf,
        output: PathBuf,
        claimed_by: PathBuf,
    },
}

/// Failures that abort a build pass before the entry document is written.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The manifest could not be read or parsed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The manifest's `main` entry is not among the recognized sources.
    #[error("entry file '{entry}' not found among sources in {}\n\nHint: set \"main\" in package.json to an existing .js/.jsx/.ts/.tsx file", root.display())]
    EntryNotFound {
        /// Entry as declared in the manifest
        entry: String,
        /// Project root that was searched
        root: PathBuf,
    },

    /// The output directory would overlap the project sources.
    #[error("refusing to use {} as the output directory: it contains the project root", .0.display())]
    UnsafeOutDir(PathBuf),

    /// The output directory or the entry document could not be written.
    #[error(transparent)]
    Output(#[from] WriteError),
}
