//! Resolution Policies
//!
//! Decides whether a recorded tag may be reused or the file must be hashed
//! again. `CacheForever` assumes content never changes for the life of the
//! process; `RecomputeAlways` assumes it may change between any two requests.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::{EtagError, Result};
use crate::etag::{CachedTag, ETag, TagStats, TagStore};
use crate::fs::FileSystem;

// == Resolver Trait ==
/// Resolves the ETag for a request path.
pub trait TagResolver: Send + Sync + 'static {
    /// Returns the tag for `path`, or `None` when the file could not be hashed.
    ///
    /// Blocks on file I/O.
    fn resolve(&self, path: &str) -> Option<ETag>;

    /// Returns a snapshot of the store statistics.
    fn stats(&self) -> TagStats;
}

// == Hashing ==
/// Opens `path` and hashes its full content.
pub fn compute_tag<F: FileSystem + ?Sized>(files: &F, path: &str) -> Result<ETag> {
    let mut reader = files.open(path).map_err(|source| EtagError::Open {
        path: path.to_string(),
        source,
    })?;

    ETag::compute(&mut reader).map_err(|source| EtagError::Read {
        path: path.to_string(),
        source,
    })
}

/// Hashes `path` and records the outcome, logging failures.
fn compute_and_record<F: FileSystem>(
    store: &mut TagStore,
    files: &F,
    path: &str,
) -> Option<ETag> {
    let tag = match compute_tag(files, path) {
        Ok(tag) => {
            debug!(path, etag = %tag, "computed etag");
            Some(tag)
        }
        Err(err) => {
            warn!(path = err.path(), error = %err, "etag computation failed");
            None
        }
    };

    store.record(path, CachedTag::from(tag.clone()));
    tag
}

/// Every write is a single insert, so a poisoned store is still consistent.
fn lock(store: &Mutex<TagStore>) -> MutexGuard<'_, TagStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Cache Forever ==
/// Static mode: the first outcome observed for a path is permanent, failures included.
pub struct CacheForever<F> {
    files: F,
    store: Mutex<TagStore>,
}

impl<F: FileSystem> CacheForever<F> {
    pub fn new(files: F) -> Self {
        Self {
            files,
            store: Mutex::new(TagStore::new()),
        }
    }
}

impl<F: FileSystem> TagResolver for CacheForever<F> {
    fn resolve(&self, path: &str) -> Option<ETag> {
        // Held across the file I/O so each path is hashed at most once.
        let mut store = lock(&self.store);

        if let Some(cached) = store.get(path) {
            return cached.tag();
        }

        compute_and_record(&mut store, &self.files, path)
    }

    fn stats(&self) -> TagStats {
        lock(&self.store).stats()
    }
}

// == Recompute Always ==
/// Dynamic mode: every lookup re-reads and re-hashes the file.
///
/// The store is still written so statistics stay meaningful, but it is never
/// read back.
pub struct RecomputeAlways<F> {
    files: F,
    store: Mutex<TagStore>,
}

impl<F: FileSystem> RecomputeAlways<F> {
    pub fn new(files: F) -> Self {
        Self {
            files,
            store: Mutex::new(TagStore::new()),
        }
    }
}

impl<F: FileSystem> TagResolver for RecomputeAlways<F> {
    fn resolve(&self, path: &str) -> Option<ETag> {
        let mut store = lock(&self.store);
        compute_and_record(&mut store, &self.files, path)
    }

    fn stats(&self) -> TagStats {
        lock(&self.store).stats()
    }
}

// == Mode ==
/// Lifecycle policy for recorded tags, chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Content is immutable for the process lifetime
    #[default]
    Static,
    /// Content may change between requests
    Dynamic,
}

impl Mode {
    /// Builds the resolver implementing this mode over `files`.
    pub fn resolver<F: FileSystem>(self, files: F) -> Arc<dyn TagResolver> {
        match self {
            Mode::Static => Arc::new(CacheForever::new(files)),
            Mode::Dynamic => Arc::new(RecomputeAlways::new(files)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Static => "static",
            Mode::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Mode::Static),
            "dynamic" => Ok(Mode::Dynamic),
            other => Err(format!("unknown etag mode: {}", other)),
        }
    }
}
