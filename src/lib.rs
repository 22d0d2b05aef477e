//! ETag File Server - static files with content-hash validators
//!
//! Serves a directory over HTTP and attaches weak SHA-256 ETags plus
//! cache-control directives so clients can revalidate cheaply.

pub mod api;
pub mod config;
pub mod error;
pub mod etag;
pub mod fs;
pub mod models;
pub mod server;

pub use api::AppState;
pub use config::Config;
pub use etag::{ETag, Mode, TagResolver};
pub use server::EtagFileServer;
