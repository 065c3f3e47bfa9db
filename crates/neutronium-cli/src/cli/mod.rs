//! Command-line interface definition for Neutronium.
//!
//! - `neutronium start` - build the project once
//! - `neutronium start --watch` - build, serve and rebuild on change

mod commands;
pub mod enums;
mod validation;

use clap::Parser;

pub use commands::{Command, StartArgs};
pub use enums::RuntimeArg;
pub use validation::{parse_debounce, parse_pragma};

/// Neutronium - compile JSX projects and serve them with live reload
#[derive(Parser, Debug)]
#[command(
    name = "neutronium",
    version,
    about = "Compile Neutronium JSX projects and serve them with live reload",
    long_about = "Neutronium compiles .js/.jsx/.ts/.tsx sources into plain ES modules that\n\
                  import the Neutronium runtime, writes an index.html for the entry, and\n\
                  optionally serves the output with automatic browser reload on change."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
