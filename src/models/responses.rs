//! Response DTOs for the service endpoints
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::etag::{Mode, TagStats};

/// Response body for the stats endpoint (GET /_etag/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Resolution mode (`static` or `dynamic`)
    pub mode: String,
    /// Lookups answered from the tag store
    pub hits: u64,
    /// Lookups that hashed the file
    pub computations: u64,
    /// Computations that failed
    pub failures: u64,
    /// Paths currently held in the tag store
    pub total_entries: usize,
    /// Hit rate (hits / (hits + computations))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from tag statistics
    pub fn new(mode: Mode, stats: &TagStats) -> Self {
        Self {
            mode: mode.to_string(),
            hits: stats.hits,
            computations: stats.computations,
            failures: stats.failures,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /_etag/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
