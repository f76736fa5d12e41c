//! Configuration schema and defaults for newscheck.
//!
//! Defines the TOML-serializable configuration structure with three
//! sections: `[server]`, `[api]` and `[logging]`.
//!
//! Every field has a built-in default. Users only need to set the values
//! they want to override.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level newscheck configuration.
///
/// Maps directly to the `~/.newscheck/config.toml` and `.newscheck.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewscheckConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Static asset server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on. `0` asks the OS for a free port.
    pub port: u16,
    /// Interface to bind.
    pub host: String,
    /// Directory the assets are served from. Relative paths resolve against
    /// the working directory at startup.
    pub root_dir: String,
    /// Number of worker threads pulling requests off the listener.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            root_dir: "ui".to_string(),
            workers: 4,
        }
    }
}

impl ServerConfig {
    /// The `host:port` pair handed to the listener.
    pub fn bind_addr(&self) -> String {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Classification API client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the classification backend (`/health` and `/detect`).
    pub base_url: String,
    /// Overall timeout for `POST /detect` in milliseconds. `0` leaves the
    /// HTTP client's defaults in place.
    pub timeout_ms: u64,
    /// Timeout for `GET /health` in milliseconds.
    pub health_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 0,
            health_timeout_ms: 5000,
        }
    }
}

impl ApiConfig {
    pub fn detect_timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn health_timeout(&self) -> Option<Duration> {
        (self.health_timeout_ms > 0).then(|| Duration::from_millis(self.health_timeout_ms))
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset: `"info"`, `"debug"`,
    /// `"warn"`, `"error"`, or any `EnvFilter` directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML template
// ---------------------------------------------------------------------------

impl NewscheckConfig {
    /// Annotated config written by `newscheck config init`.
    pub fn default_toml() -> String {
        r#"# newscheck configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Command-line flags (serve --port/--root/--host)
#   2. Environment variables (PORT, NEWSCHECK_*)
#   3. Project config (.newscheck.toml in current directory)
#   4. User global config (~/.newscheck/config.toml)
#   5. Built-in defaults

[server]
port = 3000           # PORT overrides
host = "127.0.0.1"    # NEWSCHECK_HOST overrides
root_dir = "ui"       # must contain index.html
workers = 4

[api]
base_url = "http://localhost:8080"   # NEWSCHECK_API_URL overrides
timeout_ms = 0                       # 0 = no explicit timeout
health_timeout_ms = 5000

[logging]
level = "info"        # RUST_LOG or NEWSCHECK_LOG override
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
