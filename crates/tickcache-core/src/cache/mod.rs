//! Local route tick cache.
//!
//! - `CacheStore`: loads and saves the cache file (JSON object keyed by route ID)
//! - `should_refetch`: decides whether a cached route is due for an API check
//! - `merge_ticks` / `touch_checked`: fold fetch results back into the cache

pub mod merge;
pub mod staleness;
pub mod store;

pub use merge::{merge_ticks, touch_checked, MergeStats};
pub use staleness::should_refetch;
pub use store::CacheStore;
