//! `neutronium start` implementation.
//!
//! Without `--watch`: one build, a summary, and a non-zero exit only on a
//! fatal failure. With `--watch`: an initial build, the dev server, the
//! file watcher and live reload, until Ctrl+C.

use std::path::Path;

use tokio::signal;

use crate::cli::StartArgs;
use crate::commands::utils::resolve_project_root;
use crate::config::{CliOverrides, NeutroniumConfig};
use crate::dev::open_browser;
use crate::error::{CliError, Result};
use crate::session::{run_build_once, run_watch_session};
use crate::ui;

/// Execute the start command.
///
/// # Errors
///
/// Returns errors for:
/// - A missing project root or invalid configuration
/// - A fatal build failure (single-build mode)
/// - Server bind or watcher startup failures (watch mode)
pub async fn execute(args: StartArgs) -> Result<()> {
    let root = resolve_project_root(args.root.as_deref())?;
    let config = NeutroniumConfig::load(&CliOverrides::from(&args), &root)?;

    tracing::debug!("Project root: {}", root.display());
    tracing::debug!("Output directory: {}", config.out_dir_path(&root).display());

    if args.watch {
        watch(&config, &root).await
    } else {
        build(&config, &root).await
    }
}

async fn build(config: &NeutroniumConfig, root: &Path) -> Result<()> {
    ui::info(&format!("Building {}", root.display()));

    let config = config.clone();
    let root = root.to_path_buf();
    let report = tokio::task::spawn_blocking(move || run_build_once(&config, &root))
        .await
        .map_err(|e| CliError::Custom(format!("Build task failed: {}", e)))??;

    ui::print_build_report(&report);
    Ok(())
}

async fn watch(config: &NeutroniumConfig, root: &Path) -> Result<()> {
    let session = run_watch_session(config, root).await?;

    if config.open {
        open_browser(&session.url());
    }

    ui::info("Press Ctrl+C to stop");

    if let Err(e) = signal::ctrl_c().await {
        ui::warning(&format!("Failed to listen for Ctrl+C: {}", e));
    }

    ui::info("Shutting down development server...");
    session.stop().await?;
    ui::success("Development server stopped");
    Ok(())
}
