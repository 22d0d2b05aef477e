//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::etag::Mode;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory whose files are served
    pub static_dir: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Whether file content is immutable for the process lifetime
    pub mode: Mode,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STATIC_DIR` - Directory to serve (default: ./public)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `ETAG_MODE` - `static` or `dynamic` (default: static)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            static_dir: env::var("STATIC_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            mode: env::var("ETAG_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.mode),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("./public"),
            server_port: 3000,
            mode: Mode::Static,
        }
    }
}
