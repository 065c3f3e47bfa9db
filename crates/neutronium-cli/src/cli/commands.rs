use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::enums::RuntimeArg;
use crate::cli::validation::parse_debounce;

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project, optionally watching and serving it
    ///
    /// Without --watch, runs a single build and exits non-zero only if the
    /// build fails fatally (unreadable package.json or missing entry file).
    Start(StartArgs),
}

/// Arguments for the start command
///
/// Every option except --watch and --root is optional so that values from
/// neutronium.config.json and NEUTRONIUM_* variables are not overridden
/// unless given explicitly.
#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Watch sources, serve the output and reload the browser on change
    #[arg(short, long)]
    pub watch: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output directory, relative to the project root
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Port for the development server
    ///
    /// The next free port is used if this one is busy.
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Host address for the development server
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Where compiled modules import the runtime from
    #[arg(long, value_enum, value_name = "MODE")]
    pub runtime: Option<RuntimeArg>,

    /// Debounce window in milliseconds before a rebuild starts
    #[arg(long, value_name = "MS", value_parser = parse_debounce)]
    pub debounce: Option<u64>,

    /// Skip the TypeScript type-check even if tsconfig.json exists
    #[arg(long)]
    pub no_type_check: bool,

    /// Remove the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Open the browser once the dev server is running (with --watch)
    #[arg(long, requires = "watch")]
    pub open: bool,
}
