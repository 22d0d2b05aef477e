//! ETag Module
//!
//! Content-hash validators and the path-keyed store that remembers them.

mod policy;
mod stats;
mod store;
mod tag;


// Re-export public types
pub use policy::{compute_tag, CacheForever, Mode, RecomputeAlways, TagResolver};
pub use stats::TagStats;
pub use store::{CachedTag, TagStore};
pub use tag::ETag;

// == Public Constants ==
/// `Cache-Control` value attached alongside every ETag
pub const CACHE_CONTROL: &str =
    "public; max-age=60, stale-while-revalidate=600, stale-if-error=259200";
