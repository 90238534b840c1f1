//! Runtime configuration for the relay server

use std::path::PathBuf;
use std::time::Duration;

/// Upstream requests are aborted after this long and reported as timeouts
pub const REQUEST_TIMEOUT_SECS: u64 = 5 * 60;

/// Resolved server configuration, built from CLI arguments and environment
/// variables in `main`
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the HTTP server to
    pub port: u16,
    /// Address to bind the HTTP server to
    pub bind: String,
    /// Upstream workflow-automation webhook URL
    pub webhook_url: String,
    /// Data directory for chat persistence; None disables persistence
    pub data_dir: Option<PathBuf>,
    /// Allowed CORS origins; empty means permissive
    pub cors_origins: Vec<String>,
    /// Upstream request timeout
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Default data directory under the platform-local data dir
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("chat-bridge"))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3420,
            bind: "0.0.0.0".to_string(),
            webhook_url: String::new(),
            data_dir: Self::default_data_dir(),
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}
