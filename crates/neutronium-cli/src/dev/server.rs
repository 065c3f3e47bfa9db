//! Development HTTP server.
//!
//! Serves the build output from disk on every request, so a rebuild is
//! visible as soon as its files are written. Bad requests turn into status
//! codes (403 traversal, 404 missing, 500 read failure) and never take the
//! server down.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderName, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use neutronium_compiler::{FAVICON_ROUTE, INDEX_HTML, ProjectManifest, RELOAD_PATH};
use path_clean::PathClean;
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::dev::ReloadChannel;
use crate::error::{CliError, Result};

/// How many ports above the requested one are tried before giving up.
const PORT_ATTEMPTS: u16 = 10;

const NO_CACHE_HEADERS: [(HeaderName, &str); 3] = [
    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
];

const FAVICON_CACHE: &str = "public, max-age=86400";

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Project root; `package.json` and `node_modules` live here.
    pub root: PathBuf,
    /// Build output directory, the served root for artifacts.
    pub out_dir: PathBuf,
    pub reload: ReloadChannel,
}

impl ServerState {
    pub fn new(
        root: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
        reload: ReloadChannel,
    ) -> Self {
        Self {
            root: root.into().clean(),
            out_dir: out_dir.into().clean(),
            reload,
        }
    }
}

/// Development server.
pub struct DevServer {
    state: ServerState,
}

impl DevServer {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Build the axum router with all routes.
    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(handle_index))
            .route("/index.html", get(handle_index))
            .route(FAVICON_ROUTE, get(handle_favicon))
            .route(RELOAD_PATH, get(handle_reload_socket))
            .route("/node_modules/{*path}", get(handle_node_modules))
            .fallback(handle_artifact)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self.state)
    }

    /// Serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the accept loop fails.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }
}

/// Bind `host:port`, falling back to the next few ports if it is taken.
///
/// # Errors
///
/// Returns an error when no port in the range can be bound.
pub async fn bind(host: &str, port: u16) -> Result<(TcpListener, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..PORT_ATTEMPTS {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        match TcpListener::bind((host, candidate)).await {
            Ok(listener) => {
                let addr = listener.local_addr()?;
                if offset > 0 {
                    tracing::warn!("Port {} is in use, using {} instead", port, addr.port());
                }
                return Ok((listener, addr));
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse && port != 0 => {
                last_error = Some(e);
            }
            Err(e) => {
                return Err(CliError::Server(format!(
                    "Failed to bind to {}:{}: {}",
                    host, candidate, e
                )));
            }
        }
    }

    Err(CliError::Server(format!(
        "No free port in {}..{} on {}: {}",
        port,
        port.saturating_add(PORT_ATTEMPTS),
        host,
        last_error.map_or_else(|| "port range exhausted".to_string(), |e| e.to_string())
    )))
}

async fn handle_index(State(state): State<ServerState>) -> Response {
    serve_file(&state.out_dir.join(INDEX_HTML), &NO_CACHE_HEADERS).await
}

async fn handle_favicon(State(state): State<ServerState>) -> Response {
    let favicon = match ProjectManifest::load(&state.root) {
        Ok(manifest) => manifest.favicon_path(&state.root),
        Err(e) => {
            tracing::debug!("No favicon: {}", e);
            None
        }
    };

    match favicon {
        Some(path) => serve_file(&path, &[(header::CACHE_CONTROL, FAVICON_CACHE)]).await,
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn handle_node_modules(State(state): State<ServerState>, uri: Uri) -> Response {
    let root = state.root.join("node_modules");
    let rel = uri.path().strip_prefix("/node_modules").unwrap_or(uri.path());
    match resolve_within(&root, rel) {
        Ok(path) => serve_file(&path, &NO_CACHE_HEADERS).await,
        Err(status) => status_response(status, uri.path()),
    }
}

async fn handle_artifact(State(state): State<ServerState>, uri: Uri) -> Response {
    match resolve_within(&state.out_dir, uri.path()) {
        Ok(path) => serve_file(&path, &NO_CACHE_HEADERS).await,
        Err(status) => status_response(status, uri.path()),
    }
}

async fn handle_reload_socket(
    State(state): State<ServerState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| reload_connection(socket, state.reload))
}

/// Forward reload tokens to one page until either side goes away.
async fn reload_connection(mut socket: WebSocket, reload: ReloadChannel) {
    let (id, mut rx) = reload.register();

    loop {
        tokio::select! {
            token = rx.recv() => match token {
                Some(token) => {
                    if socket.send(Message::Text(token.into())).await.is_err() {
                        break;
                    }
                }
                None => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    reload.unregister(id);
}

/// Map a request path onto a file under `root`.
///
/// The path is percent-decoded and lexically normalized; anything that lands
/// outside `root`, or is a symlink pointing outside it, is `403`.
pub(crate) fn resolve_within(
    root: &Path,
    request_path: &str,
) -> std::result::Result<PathBuf, StatusCode> {
    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .map_err(|_| StatusCode::FORBIDDEN)?;

    let rel = decoded.trim_start_matches('/');
    if rel.contains('\0') {
        return Err(StatusCode::FORBIDDEN);
    }

    let candidate = root.join(rel).clean();
    if !candidate.starts_with(root) {
        return Err(StatusCode::FORBIDDEN);
    }

    if let (Ok(real), Ok(real_root)) = (candidate.canonicalize(), root.canonicalize()) {
        if !real.starts_with(&real_root) {
            return Err(StatusCode::FORBIDDEN);
        }
    }

    Ok(candidate)
}

async fn serve_file(path: &Path, headers: &[(HeaderName, &'static str)]) -> Response {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return status_response(StatusCode::NOT_FOUND, &path.display().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return status_response(StatusCode::NOT_FOUND, &path.display().to_string());
        }
        Err(e) => return read_failure(path, &e),
    }

    match tokio::fs::read(path).await {
        Ok(content) => {
            let mut response = (
                [(header::CONTENT_TYPE, determine_content_type(path))],
                content,
            )
                .into_response();
            for (name, value) in headers {
                response
                    .headers_mut()
                    .insert(name.clone(), header::HeaderValue::from_static(value));
            }
            response
        }
        Err(e) => read_failure(path, &e),
    }
}

fn read_failure(path: &Path, err: &std::io::Error) -> Response {
    tracing::warn!("Failed to read {}: {}", path.display(), err);
    status_response(StatusCode::INTERNAL_SERVER_ERROR, &path.display().to_string())
}

fn status_response(status: StatusCode, what: &str) -> Response {
    let message = match status {
        StatusCode::FORBIDDEN => "Forbidden".to_string(),
        StatusCode::NOT_FOUND => format!("File not found: {}", what),
        _ => "Failed to read file".to_string(),
    };
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        message,
    )
        .into_response()
}

/// Determine content type from file extension.
fn determine_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "ico" => "image/x-icon",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Fixture {
        _temp: TempDir,
        root: PathBuf,
    }

    fn fixture(manifest: &str) -> Fixture {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("project");
        fs::create_dir_all(root.join("dist/components")).unwrap();
        fs::write(root.join("package.json"), manifest).unwrap();
        fs::write(root.join("dist/index.html"), "<!DOCTYPE html><p>index</p>").unwrap();
        fs::write(root.join("dist/App.js"), "console.log(1);").unwrap();
        fs::write(root.join("dist/components/Header.js"), "export {};").unwrap();
        fs::write(root.join("icon.png"), [137u8, 80, 78, 71]).unwrap();
        fs::write(temp.path().join("secret.txt"), "top secret").unwrap();
        fs::write(root.join("secret.txt"), "project secret").unwrap();
        Fixture { _temp: temp, root }
    }

    fn router(fixture: &Fixture) -> Router {
        DevServer::new(ServerState::new(
            &fixture.root,
            fixture.root.join("dist"),
            ReloadChannel::new(),
        ))
        .router()
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn assert_no_cache(response: &Response) {
        let headers = response.headers();
        assert_eq!(
            headers[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert_eq!(headers[header::EXPIRES], "0");
    }

    #[tokio::test]
    async fn test_root_and_index_serve_entry_document() {
        let fx = fixture("{}");
        for uri in ["/", "/index.html"] {
            let response = get(router(&fx), uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_no_cache(&response);
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "text/html; charset=utf-8"
            );
            assert!(body_text(response).await.contains("<p>index</p>"));
        }
    }

    #[tokio::test]
    async fn test_artifacts_are_served_uncached() {
        let fx = fixture("{}");
        let response = get(router(&fx), "/components/Header.js").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript"
        );
        assert_no_cache(&response);
        assert_eq!(body_text(response).await, "export {};");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let fx = fixture("{}");
        let response = get(router(&fx), "/Nope.js").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get(router(&fx), "/components").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let fx = fixture("{}");
        for uri in [
            "/../secret.txt",
            "/../../secret.txt",
            "/%2e%2e/secret.txt",
            "/components/%2E%2E/%2E%2E/secret.txt",
            "/node_modules/../../secret.txt",
        ] {
            let response = get(router(&fx), uri).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
            assert!(!body_text(response).await.contains("secret"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_invalid_percent_encoding_is_forbidden() {
        let fx = fixture("{}");
        let response = get(router(&fx), "/%ff%fe.js").await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_favicon_without_declaration_is_204() {
        let fx = fixture("{}");
        let response = get(router(&fx), "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_declared_favicon_is_cached_for_a_day() {
        let fx = fixture(r#"{"favicon": "icon.png"}"#);
        let response = get(router(&fx), "/favicon.ico").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=86400"
        );
    }

    #[tokio::test]
    async fn test_declared_but_missing_favicon_is_404() {
        let fx = fixture(r#"{"favicon": "missing.ico"}"#);
        let response = get(router(&fx), "/favicon.ico").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_node_modules_are_served_from_project_root() {
        let fx = fixture("{}");
        let runtime = fx.root.join("node_modules/neutronium/src");
        fs::create_dir_all(&runtime).unwrap();
        fs::write(runtime.join("index.js"), "export const h = 1;").unwrap();

        let response = get(router(&fx), "/node_modules/neutronium/src/index.js").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "export const h = 1;");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escaping_root_is_forbidden() {
        let fx = fixture("{}");
        std::os::unix::fs::symlink(
            fx.root.join("secret.txt"),
            fx.root.join("dist/link.txt"),
        )
        .unwrap();

        let response = get(router(&fx), "/link.txt").await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_resolve_within_normalizes_inside_root() {
        let root = Path::new("/srv/dist");
        assert_eq!(
            resolve_within(root, "/a/./b/../App.js").unwrap(),
            PathBuf::from("/srv/dist/a/App.js")
        );
        assert_eq!(
            resolve_within(root, "/a%20b.js").unwrap(),
            PathBuf::from("/srv/dist/a b.js")
        );
        assert_eq!(
            resolve_within(root, "/../dist-other/x.js"),
            Err(StatusCode::FORBIDDEN)
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(determine_content_type(Path::new("a.mjs")), "application/javascript");
        assert_eq!(determine_content_type(Path::new("favicon.ico")), "image/x-icon");
        assert_eq!(determine_content_type(Path::new("x")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_bind_uses_next_port_when_taken() {
        let (first, first_addr) = bind("127.0.0.1", 0).await.unwrap();
        let (_second, second_addr) = bind("127.0.0.1", first_addr.port()).await.unwrap();
        assert_ne!(first_addr.port(), second_addr.port());
        drop(first);
    }
}
