//! Neutronium CLI entry point.
//!
//! Parses arguments, initializes logging and colors, and dispatches the
//! command. Errors become miette diagnostics here and nowhere else.

use clap::Parser;
use miette::Result;
use neutronium_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Start(start_args) => commands::start_execute(start_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
