//! API Handlers
//!
//! HTTP request handlers for the service endpoints. Static files are not
//! served by a handler but by the `EtagFileServer` fallback service.

use axum::{extract::State, Json};

use crate::config::Config;
use crate::etag::Mode;
use crate::models::{HealthResponse, StatsResponse};
use crate::server::EtagFileServer;

/// Application state shared across all handlers.
///
/// The file server is cheap to clone; every clone shares one tag store.
#[derive(Clone)]
pub struct AppState {
    /// Static file service with ETag support
    pub files: EtagFileServer,
    /// Mode the tag store was built with
    pub mode: Mode,
}

impl AppState {
    /// Creates a new AppState around an existing file server.
    pub fn new(files: EtagFileServer, mode: Mode) -> Self {
        Self { files, mode }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Serves `config.static_dir` using the configured mode.
    pub fn from_config(config: &Config) -> Self {
        let files = EtagFileServer::serve_dir(&config.static_dir, config.mode);
        Self::new(files, config.mode)
    }
}

/// Handler for GET /_etag/stats
///
/// Returns current tag store statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.files.resolver().stats();
    Json(StatsResponse::new(state.mode, &stats))
}

/// Handler for GET /_etag/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
