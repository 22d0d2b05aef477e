//! Server Module
//!
//! The ETag file server: a tower service wrapping a static-file service.

mod conditional;
mod service;

pub use conditional::{Outcome, Preconditions};
pub use service::EtagFileServer;
