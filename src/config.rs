//! Configuration loading and defaults.
//!
//! Configuration is resolved in order of precedence (highest wins):
//!
//! 1. **Environment variables** — `NURSEEASE_LISTEN`,
//!    `NURSEEASE_ADMIN_PASSWORD`, `NURSEEASE_DATA_DIR`
//! 2. **Config file** — path via `--config <path>`, or `nursease.toml` in CWD
//! 3. **Compiled defaults** — see each field's default value below
//!
//! The TOML file mirrors the struct hierarchy:
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:8000"
//! data_dir = "/var/lib/nursease"
//! max_upload_size = 10485760  # 10 MiB
//!
//! [auth]
//! admin_username = "admin"
//! admin_password = "your-secret-password"
//! session_ttl_secs = 86400
//!
//! [cors]
//! allowed_origins = ["http://localhost:5173"]
//! allow_credentials = true
//! allow_methods = ["*"]
//! allow_headers = ["*"]
//!
//! [logging]
//! level = "info"
//! ```

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server and resource-limit settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind (default `0.0.0.0:8000`).
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Directory for persistent data (uploads). Default `/var/lib/nursease`.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Maximum accepted upload size in bytes (default 10 MiB).
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

/// Administrator credentials and session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Administrator login name (default `admin`).
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Administrator password. Override with `NURSEEASE_ADMIN_PASSWORD`.
    /// Defaults to `"change-me"` which triggers a startup warning.
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    /// Seconds a session token stays valid after login (default 86 400).
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

/// Cross-origin policy applied uniformly to every route.
///
/// `allow_methods` / `allow_headers` accept either an explicit list or the
/// single entry `"*"`. A `"*"` entry in `allowed_origins` combined with
/// `allow_credentials = true` is rejected at startup — browsers forbid that
/// combination, so the server refuses to encode it.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Origins permitted to make cross-origin requests.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Whether cross-origin requests may carry credentials (default true).
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
    /// Permitted methods; `["*"]` mirrors whatever the request asks for.
    #[serde(default = "default_wildcard")]
    pub allow_methods: Vec<String>,
    /// Permitted headers; `["*"]` mirrors whatever the request asks for.
    #[serde(default = "default_wildcard")]
    pub allow_headers: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter level (default `info`). Overridden by `RUST_LOG` env var.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_data_dir() -> String {
    "/var/lib/nursease".to_string()
}
fn default_max_upload_size() -> usize {
    10 * 1024 * 1024 // 10 MiB
}
fn default_admin_username() -> String {
    "admin".to_string()
}
fn default_admin_password() -> String {
    "change-me".to_string()
}
fn default_session_ttl_secs() -> u64 {
    86_400
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}
fn default_allow_credentials() -> bool {
    true
}
fn default_wildcard() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            data_dir: default_data_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allow_credentials: default_allow_credentials(),
            allow_methods: default_wildcard(),
            allow_headers: default_wildcard(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration with the precedence chain: env vars > file > defaults.
    ///
    /// If `path` is `Some`, reads that file (panics on failure). Otherwise looks
    /// for `nursease.toml` in the current directory, falling back to compiled
    /// defaults.
    pub fn load(path: Option<&str>) -> Self {
        let mut config = if let Some(p) = path {
            let content = std::fs::read_to_string(p)
                .unwrap_or_else(|e| panic!("Failed to read config file {p}: {e}"));
            toml::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse config file {p}: {e}"))
        } else if Path::new("nursease.toml").exists() {
            let content =
                std::fs::read_to_string("nursease.toml").expect("Failed to read nursease.toml");
            toml::from_str(&content).expect("Failed to parse nursease.toml")
        } else {
            Config::default()
        };

        // Env var overrides
        if let Ok(listen) = std::env::var("NURSEEASE_LISTEN") {
            config.server.listen = listen;
        }
        if let Ok(password) = std::env::var("NURSEEASE_ADMIN_PASSWORD") {
            config.auth.admin_password = password;
        }
        if let Ok(dir) = std::env::var("NURSEEASE_DATA_DIR") {
            config.server.data_dir = dir;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_served_contract() {
        let config = Config::default();
        assert_eq!(config.server.listen, "0.0.0.0:8000");
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
        assert!(config.cors.allow_credentials);
        assert_eq!(config.cors.allow_methods, vec!["*"]);
        assert_eq!(config.cors.allow_headers, vec!["*"]);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[auth]\nadmin_password = \"s3cret\"\n").unwrap();
        assert_eq!(config.auth.admin_password, "s3cret");
        assert_eq!(config.auth.admin_username, "admin");
        assert_eq!(config.server.listen, "0.0.0.0:8000");
    }
}
