//! API Module
//!
//! Routing for the ETag file server.
//!
//! # Endpoints
//! - `GET /_etag/health` - Health check endpoint
//! - `GET /_etag/stats` - Tag store statistics
//! - anything else - Static files, with `ETag` and `Cache-Control` attached

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
