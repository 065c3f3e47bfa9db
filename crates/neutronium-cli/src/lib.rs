//! Neutronium CLI - compile JSX projects and serve them with live reload.
//!
//! # Architecture
//!
//! - [`cli`] - argument parsing with clap
//! - [`config`] - layered configuration (defaults, file, env, flags)
//! - [`commands`] - command implementations
//! - [`session`] - single builds and watch sessions
//! - [`dev`] - watcher, debouncer, dev server and reload channel
//! - [`error`] - error types with actionable messages
//! - [`logger`] - structured logging with tracing
//! - [`ui`] - terminal status output
//!
//! # Example
//!
//! ```rust,no_run
//! use neutronium_cli::config::NeutroniumConfig;
//! use neutronium_cli::session::run_build_once;
//!
//! let report = run_build_once(&NeutroniumConfig::default(), "./my-app".as_ref())?;
//! println!("{} files written", report.files_written.len());
//! # Ok::<(), neutronium_cli::CliError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod session;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result};
pub use session::{WatchSession, run_build_once, run_watch_session};
