//! Tag Store Module
//!
//! Path-keyed map of computed tags. There is no eviction and no TTL: an entry
//! lives as long as the store.

use std::collections::HashMap;

use crate::etag::{ETag, TagStats};

// == Cached Tag ==
/// Outcome recorded for a path.
///
/// A path with no entry at all has never been looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedTag {
    /// Opening or reading the file failed
    Failed,
    /// The file was hashed successfully
    Ready(ETag),
}

impl CachedTag {
    /// Returns the tag, if one was computed.
    pub fn tag(&self) -> Option<ETag> {
        match self {
            CachedTag::Failed => None,
            CachedTag::Ready(tag) => Some(tag.clone()),
        }
    }
}

impl From<Option<ETag>> for CachedTag {
    fn from(outcome: Option<ETag>) -> Self {
        outcome.map_or(CachedTag::Failed, CachedTag::Ready)
    }
}

// == Tag Store ==
/// At most one entry per path.
#[derive(Debug, Default)]
pub struct TagStore {
    /// Path to outcome
    entries: HashMap<String, CachedTag>,
    /// Performance statistics
    stats: TagStats,
}

impl TagStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Looks up the recorded outcome for `path` and counts a hit when present.
    pub fn get(&mut self, path: &str) -> Option<&CachedTag> {
        let entry = self.entries.get(path);
        if entry.is_some() {
            self.stats.record_hit();
        }
        entry
    }

    // == Record ==
    /// Records a fresh computation for `path`, replacing any prior entry.
    pub fn record(&mut self, path: &str, outcome: CachedTag) {
        self.stats.record_computation();
        if outcome == CachedTag::Failed {
            self.stats.record_failure();
        }

        self.entries.insert(path.to_string(), outcome);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> TagStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
