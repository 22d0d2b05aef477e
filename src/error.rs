//! Error types for the ETag file server
//!
//! Both error kinds are non-fatal: they are logged and downgrade a request to
//! "served without an ETag". None of them ever reaches an HTTP caller.

use std::io;

use thiserror::Error;

// == ETag Error Enum ==
/// Failure while computing the ETag of a file.
#[derive(Error, Debug)]
pub enum EtagError {
    /// The resource could not be opened (missing, permission denied, bad path)
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The resource was opened but streaming its content failed
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl EtagError {
    /// Returns the request path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            EtagError::Open { path, .. } | EtagError::Read { path, .. } => path,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for ETag computation.
pub type Result<T> = std::result::Result<T, EtagError>;
