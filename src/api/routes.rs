//! API Routes
//!
//! Configures the Axum router: service endpoints first, static files as the
//! fallback for every other path.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{health_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /_etag/health` - Health check endpoint
/// - `GET /_etag/stats` - Tag store statistics
/// - fallback - `EtagFileServer` over the configured directory
///
/// # Middleware
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let files = state.files.clone();

    Router::new()
        .route("/_etag/health", get(health_handler))
        .route("/_etag/stats", get(stats_handler))
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
