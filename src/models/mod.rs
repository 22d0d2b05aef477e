//! Response models for the service endpoints
//!
//! DTOs serialized as JSON by the health and stats handlers.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
