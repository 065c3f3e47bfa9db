//! The two entry points the CLI drives: a single build, and a watch session
//! that builds, serves and rebuilds on change.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use neutronium_compiler::{BuildReport, Builder};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::NeutroniumConfig;
use crate::dev::{
    ChangeFilter, Debouncer, DevServer, FileChange, FileWatcher, ReloadChannel, ServerState, bind,
};
use crate::error::{CliError, Result};
use crate::ui;

/// How long `stop` waits for open connections to drain.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run one build pass without live reload.
///
/// # Errors
///
/// Only fatal build failures are errors; per-file and type-check failures
/// are part of the returned report.
pub fn run_build_once(config: &NeutroniumConfig, root: &Path) -> Result<BuildReport> {
    let builder = Builder::new(config.build_options(root, false));
    Ok(builder.build()?)
}

/// A running watch session.
///
/// Dropping the handle also ends the session: the shutdown sender goes
/// away, so the rebuild loop exits and the server stops accepting
/// connections. Only [`WatchSession::stop`] waits for that to finish and
/// reports server errors.
pub struct WatchSession {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    server: JoinHandle<Result<()>>,
    rebuild_loop: JoinHandle<()>,
    reload: ReloadChannel,
}

impl WatchSession {
    /// Address the dev server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn reload(&self) -> &ReloadChannel {
        &self.reload
    }

    /// Stop watching, disconnect reload clients and shut the server down.
    ///
    /// A rebuild that is already running finishes first.
    ///
    /// # Errors
    ///
    /// Returns the server's error if it failed while running.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.reload.disconnect_all();

        if let Err(e) = self.rebuild_loop.await {
            tracing::warn!("Rebuild loop ended abnormally: {}", e);
        }

        let mut server = self.server;
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut server).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(CliError::Server(format!("Server task failed: {}", e))),
            Err(_) => {
                tracing::warn!(
                    "Server did not stop within {}s, aborting",
                    SHUTDOWN_TIMEOUT.as_secs()
                );
                server.abort();
                Ok(())
            }
        }
    }
}

/// Build, then serve the output and rebuild whenever sources change.
///
/// A fatal initial build is reported and the session still starts, so that
/// fixing the problem triggers a rebuild.
///
/// # Errors
///
/// Returns an error if the server cannot bind or the watcher cannot start.
pub async fn run_watch_session(config: &NeutroniumConfig, root: &Path) -> Result<WatchSession> {
    let options = config.build_options(root, true);
    let out_dir = options.out_dir_path();
    let builder = Arc::new(Builder::new(options));

    ui::info("Performing initial build...");
    rebuild(&builder).await;

    let (listener, addr) = bind(&config.host, config.port).await?;
    let (watcher, changes) = FileWatcher::new(ChangeFilter::new(root, &out_dir))?;
    ui::info(&format!(
        "Watching for changes in: {}",
        watcher.root().display()
    ));

    let reload = ReloadChannel::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server = DevServer::new(ServerState::new(root, &out_dir, reload.clone()));
    let server = tokio::spawn(server.serve(listener, wait_for_shutdown(shutdown_rx.clone())));

    let rebuild_loop = tokio::spawn(rebuild_loop(
        builder,
        watcher,
        changes,
        Debouncer::new(config.debounce()),
        reload.clone(),
        shutdown_rx,
    ));

    ui::success(&format!("Development server running at http://{}", addr));

    Ok(WatchSession {
        addr,
        shutdown: shutdown_tx,
        server,
        rebuild_loop,
        reload,
    })
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    // Either a stop signal or a dropped sender ends the wait.
    let _ = shutdown.changed().await;
}

async fn rebuild_loop(
    builder: Arc<Builder>,
    watcher: FileWatcher,
    mut changes: mpsc::Receiver<FileChange>,
    debouncer: Debouncer,
    reload: ReloadChannel,
    mut shutdown: watch::Receiver<bool>,
) {
    // Held for the lifetime of the loop; dropping it stops the OS watch.
    let _watcher = watcher;

    loop {
        let batch = tokio::select! {
            batch = debouncer.next_batch(&mut changes) => batch,
            _ = shutdown.changed() => break,
        };
        let Some(batch) = batch else {
            tracing::debug!("Change channel closed");
            break;
        };

        describe_batch(&batch);

        if rebuild(&builder).await {
            let report = reload.broadcast();
            tracing::debug!(
                "Reload sent to {} client(s), {} skipped",
                report.sent,
                report.skipped
            );
        }
    }
}

fn describe_batch(batch: &[FileChange]) {
    match batch {
        [single] => ui::info(&format!(
            "File {}: {}",
            single.label(),
            single.path().display()
        )),
        _ => ui::info(&format!("{} files changed, rebuilding", batch.len())),
    }
    for change in batch {
        tracing::debug!("{} {}", change.label(), change.path().display());
    }
}

/// Run one build pass on the blocking pool. Returns `false` on a fatal
/// failure.
async fn rebuild(builder: &Arc<Builder>) -> bool {
    let task = Arc::clone(builder);
    match tokio::task::spawn_blocking(move || task.build()).await {
        Ok(Ok(report)) => {
            ui::print_build_report(&report);
            true
        }
        Ok(Err(e)) => {
            ui::error(&format!("Build failed: {}", e));
            false
        }
        Err(e) => {
            ui::error(&format!("Build task failed: {}", e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"main": "App.js"}"#).unwrap();
        fs::write(dir.path().join("App.js"), "const app = <h1>Hi</h1>;\n").unwrap();
        dir
    }

    fn config() -> NeutroniumConfig {
        NeutroniumConfig {
            type_check: false,
            ..NeutroniumConfig::default()
        }
    }

    #[test]
    fn test_build_once_writes_output_without_reload_listener() {
        let dir = project();
        let report = run_build_once(&config(), dir.path()).unwrap();

        assert!(report.is_clean());
        let html = fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert!(!html.contains("WebSocket"));
    }

    #[test]
    fn test_build_once_reports_fatal_failure() {
        let dir = project();
        fs::remove_file(dir.path().join("App.js")).unwrap();

        let err = run_build_once(&config(), dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Build(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_watch_session_serves_and_stops() {
        let dir = project();
        let root = dir.path().canonicalize().unwrap();
        let config = NeutroniumConfig {
            port: 0,
            ..config()
        };

        let session = run_watch_session(&config, &root).await.unwrap();
        assert_ne!(session.addr().port(), 0);

        let html = fs::read_to_string(root.join("dist/index.html")).unwrap();
        assert!(html.contains("/__neutronium_reload__"));

        let stream = tokio::net::TcpStream::connect(session.addr()).await;
        assert!(stream.is_ok());
        drop(stream);

        session.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dropping_session_shuts_server_down() {
        let dir = project();
        let root = dir.path().canonicalize().unwrap();
        let config = NeutroniumConfig {
            port: 0,
            ..config()
        };

        let session = run_watch_session(&config, &root).await.unwrap();
        let addr = session.addr();
        drop(session);

        let mut refused = false;
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(addr).await.is_err() {
                refused = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(refused, "server still accepting connections after drop");
    }
}
