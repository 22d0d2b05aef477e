//! Tag Statistics Module
//!
//! Tracks how often tags were served from the store versus computed from disk.

use serde::Serialize;

// == Tag Stats ==
/// Tracks tag store performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagStats {
    /// Lookups answered from the store without touching the file
    pub hits: u64,
    /// Lookups that opened and hashed the file
    pub computations: u64,
    /// Computations that failed to open or read the file
    pub failures: u64,
    /// Current number of paths in the store
    pub total_entries: usize,
}

impl TagStats {
    // == Constructor ==
    /// Creates a new TagStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the store hit rate.
    ///
    /// Returns hits / (hits + computations), or 0.0 if nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.computations;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_computation(&mut self) {
        self.computations += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
