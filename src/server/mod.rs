//! Static asset server.
//!
//! Serves files from a single root directory over HTTP (sync, via
//! `tiny_http`):
//! - `/` maps to `index.html`, `/X` maps to `<root>/X`
//! - paths escaping the root answer `403`, missing paths and directories `404`
//! - content type comes from the extension table in [`mime`]
//! - every file response carries permissive CORS headers
//!
//! A small pool of worker threads pulls requests off the shared listener so
//! a slow client never blocks the others. The pool polls a [`Shutdown`] flag
//! and drops the listener once it is tripped.

pub mod mime;
pub mod resolve;
pub mod shutdown;

use std::io::{self, Cursor};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use resolve::{AssetRoot, INDEX_FILE, Resolution};
pub use shutdown::Shutdown;

/// How long a worker blocks on the listener before re-checking shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

/// Fatal conditions detected before the first request is served.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(
        "'{}' directory not found! Make sure you're running this from the project root directory.",
        .0.display()
    )]
    MissingRoot(PathBuf),

    #[error("'index.html' not found in '{}' directory!", .0.display())]
    MissingIndex(PathBuf),

    #[error("port {port} is already in use! Try stopping other servers or use a different port.")]
    AddrInUse { port: u16 },

    #[error("failed to start HTTP server on {addr}: {reason}")]
    Bind { addr: String, reason: String },
}

/// A bound, not yet running, asset server.
pub struct StaticServer {
    server: Server,
    root: AssetRoot,
    workers: usize,
}

impl StaticServer {
    /// Check the root directory and bind the listener.
    ///
    /// Fails fast when the root or its `index.html` is missing, or when the
    /// port cannot be bound.
    pub fn bind(config: &ServerConfig) -> Result<Self, StartupError> {
        let dir = Path::new(&config.root_dir);
        if !dir.is_dir() {
            return Err(StartupError::MissingRoot(dir.to_path_buf()));
        }
        if !dir.join(INDEX_FILE).is_file() {
            return Err(StartupError::MissingIndex(dir.to_path_buf()));
        }
        let root =
            AssetRoot::open(dir).map_err(|_| StartupError::MissingRoot(dir.to_path_buf()))?;

        let addr = config.bind_addr();
        let server = Server::http(&addr).map_err(|e| {
            let in_use = e
                .downcast_ref::<io::Error>()
                .is_some_and(|io| io.kind() == io::ErrorKind::AddrInUse);
            if in_use {
                StartupError::AddrInUse { port: config.port }
            } else {
                StartupError::Bind {
                    addr: addr.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        Ok(Self {
            server,
            root,
            workers: config.workers.max(1),
        })
    }

    /// The address actually bound (resolves port `0`).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Canonical root directory being served.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Serve requests until `shutdown` is tripped.
    ///
    /// Blocks the current thread. The listening socket is closed when this
    /// returns, on every path.
    pub fn run(self, shutdown: &Shutdown) -> anyhow::Result<()> {
        let Self {
            server,
            root,
            workers,
        } = self;

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| worker_loop(&server, &root, shutdown));
            }
        });

        drop(server);
        info!("server stopped");
        Ok(())
    }
}

fn worker_loop(server: &Server, root: &AssetRoot, shutdown: &Shutdown) {
    poll_until_shutdown(
        shutdown,
        || server.recv_timeout(POLL_INTERVAL),
        |request| handle(request, root),
    );
}

/// Pull work from `recv` until shutdown is requested.
///
/// A receive error backs off for one poll interval so a broken listener
/// cannot spin the worker.
fn poll_until_shutdown<T>(
    shutdown: &Shutdown,
    mut recv: impl FnMut() -> io::Result<Option<T>>,
    mut handle: impl FnMut(T),
) {
    while !shutdown.is_requested() {
        match recv() {
            Ok(Some(item)) => handle(item),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to receive request");
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

fn handle(request: Request, root: &AssetRoot) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let reply = route(&method, &url, root);
    access_log(&method, &url, &reply);

    if let Err(e) = request.respond(reply.into_response()) {
        debug!(error = %e, url = %url, "client went away before the response was written");
    }
}

/// One `info` event per request; the subscriber adds the timestamp.
fn access_log(method: &Method, url: &str, reply: &Reply) {
    let resolved = reply
        .resolved
        .as_deref()
        .map_or_else(|| "-".to_string(), |p| p.display().to_string());

    info!(method = %method, url = %url, path = %resolved, status = reply.status, "request");
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// A response decided for one request, before it is written to the socket.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub cors: bool,
    pub allow: bool,
    /// Filesystem path the URL resolved to, when one was computed.
    pub resolved: Option<PathBuf>,
}

impl Reply {
    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: mime::DEFAULT_MIME,
            body: body.as_bytes().to_vec(),
            cors: false,
            allow: false,
            resolved: None,
        }
    }

    fn at(mut self, path: &Path) -> Self {
        self.resolved = Some(path.to_path_buf());
        self
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body)
            .with_status_code(StatusCode(self.status))
            .with_header(header("Content-Type", self.content_type));
        if self.cors {
            for (name, value) in CORS_HEADERS {
                response.add_header(header(name, value));
            }
        }
        if self.allow {
            response.add_header(header("Allow", "GET, HEAD, OPTIONS"));
        }
        response
    }
}

/// Decide the reply for a request against the asset root.
pub fn route(method: &Method, url: &str, root: &AssetRoot) -> Reply {
    match method {
        Method::Get | Method::Head => serve_path(url, root),
        Method::Options => Reply {
            cors: true,
            allow: true,
            ..Reply::text(204, "")
        },
        _ => Reply {
            allow: true,
            ..Reply::text(405, "405 - Method Not Allowed")
        },
    }
}

fn serve_path(url: &str, root: &AssetRoot) -> Reply {
    let resolution = root.resolve(url);
    let reply = match &resolution {
        Resolution::File(path) => match std::fs::read(path) {
            Ok(body) => Reply {
                content_type: mime::mime_type(path),
                body,
                cors: true,
                ..Reply::text(200, "")
            },
            Err(_) => Reply::text(404, "404 - File Not Found"),
        },
        Resolution::Forbidden(_) => Reply::text(403, "403 - Forbidden"),
        Resolution::NotFound(_) => Reply::text(404, "404 - File Not Found"),
        Resolution::NotAFile(_) => Reply::text(404, "404 - Not a file"),
    };
    reply.at(resolution.path())
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name, value).expect("static header is valid ASCII")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> (tempfile::TempDir, AssetRoot) {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("ui");
        fs::create_dir_all(&site).unwrap();
        fs::write(site.join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(site.join("app.js"), "console.log(1)").unwrap();
        fs::write(dir.path().join("private.txt"), "do not serve").unwrap();
        let root = AssetRoot::open(&site).unwrap();
        (dir, root)
    }

    #[test]
    fn get_file_returns_body_type_and_cors() {
        let (_dir, root) = site();
        let reply = route(&Method::Get, "/app.js", &root);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/javascript");
        assert_eq!(reply.body, b"console.log(1)");
        assert!(reply.cors);
    }

    #[test]
    fn root_and_index_are_equivalent() {
        let (_dir, root) = site();
        let a = route(&Method::Get, "/", &root);
        let b = route(&Method::Get, "/index.html", &root);
        assert_eq!(a.status, 200);
        assert_eq!(a.body, b.body);
        assert_eq!(a.content_type, b.content_type);
    }

    #[test]
    fn traversal_discloses_nothing() {
        let (_dir, root) = site();
        let reply = route(&Method::Get, "/../private.txt", &root);
        assert_eq!(reply.status, 403);
        assert_eq!(reply.body, b"403 - Forbidden");
        assert!(!reply.cors);
    }

    #[test]
    fn missing_file_is_404() {
        let (_dir, root) = site();
        let reply = route(&Method::Get, "/nope.css", &root);
        assert_eq!(reply.status, 404);
        assert_eq!(reply.body, b"404 - File Not Found");
    }

    #[test]
    fn options_is_a_cors_preflight() {
        let (_dir, root) = site();
        let reply = route(&Method::Options, "/anything", &root);
        assert_eq!(reply.status, 204);
        assert!(reply.cors);
        assert!(reply.body.is_empty());
        assert!(reply.resolved.is_none());
    }

    #[test]
    fn other_methods_are_rejected() {
        let (_dir, root) = site();
        let reply = route(&Method::Post, "/index.html", &root);
        assert_eq!(reply.status, 405);
        assert!(reply.allow);
    }

    fn logged(method: Method, url: &str, root: &AssetRoot) -> (Reply, String) {
        crate::logging::capture(|| {
            let reply = route(&method, url, root);
            access_log(&method, url, &reply);
            reply
        })
    }

    #[test]
    fn access_log_records_served_file() {
        let (_dir, root) = site();
        let (reply, output) = logged(Method::Get, "/app.js", &root);
        assert_eq!(reply.status, 200);
        assert!(output.contains("INFO"), "{output}");
        assert!(output.contains("request"), "{output}");
        assert!(output.contains("method=GET"), "{output}");
        assert!(output.contains("url=/app.js"), "{output}");
        assert!(output.contains("status=200"), "{output}");
        let expected = root.path().join("app.js").display().to_string();
        assert!(output.contains(&format!("path={expected}")), "{output}");
    }

    #[test]
    fn access_log_records_rejected_requests() {
        let (_dir, root) = site();

        let (_, forbidden) = logged(Method::Get, "/../private.txt", &root);
        assert!(forbidden.contains("url=/../private.txt"), "{forbidden}");
        assert!(forbidden.contains("status=403"), "{forbidden}");
        assert!(!forbidden.contains("do not serve"), "{forbidden}");

        let (_, missing) = logged(Method::Get, "/nope.css", &root);
        assert!(missing.contains("status=404"), "{missing}");
        assert!(missing.contains("nope.css"), "{missing}");

        let (_, preflight) = logged(Method::Options, "/x", &root);
        assert!(preflight.contains("method=OPTIONS"), "{preflight}");
        assert!(preflight.contains("path=-"), "{preflight}");
    }

    #[test]
    fn receive_errors_back_off() {
        let shutdown = Shutdown::new();
        let mut calls = 0;
        let started = std::time::Instant::now();

        poll_until_shutdown(
            &shutdown,
            || {
                calls += 1;
                if calls == 3 {
                    shutdown.trigger();
                }
                Err::<Option<()>, _>(io::Error::other("listener broken"))
            },
            |_| {},
        );

        assert_eq!(calls, 3);
        assert!(started.elapsed() >= POLL_INTERVAL * 2);
    }

    #[test]
    fn items_are_handled_until_shutdown() {
        let shutdown = Shutdown::new();
        let mut queue = vec![Some(1), None, Some(2)].into_iter();
        let mut handled = Vec::new();

        poll_until_shutdown(
            &shutdown,
            || match queue.next() {
                Some(item) => Ok(item),
                None => {
                    shutdown.trigger();
                    Ok(None)
                }
            },
            |item| handled.push(item),
        );

        assert_eq!(handled, vec![1, 2]);
    }

    #[test]
    fn bind_fails_fast_without_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            port: 0,
            root_dir: dir.path().join("missing").display().to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            StaticServer::bind(&config),
            Err(StartupError::MissingRoot(_))
        ));
    }

    #[test]
    fn bind_fails_fast_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            port: 0,
            root_dir: dir.path().display().to_string(),
            ..ServerConfig::default()
        };
        let err = StaticServer::bind(&config).err().unwrap();
        assert!(matches!(err, StartupError::MissingIndex(_)));
        assert!(err.to_string().contains("index.html"));
    }
}
