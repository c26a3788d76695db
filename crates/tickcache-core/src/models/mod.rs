//! Data models for route tick data.
//!
//! - `RouteCacheEntry`, `CacheMap`: the persisted route → users cache
//! - `TickPage`, `TickEntry`, `TickUser`: the remote ticks API payload
//! - `RouteRef`: a route taken from a user's tick list
//! - `TargetUser`: the user a comparison is run for

pub mod route;
pub mod tick;
pub mod user;

pub use route::{dedupe_urls, format_timestamp, parse_timestamp, CacheMap, RouteCacheEntry, RouteRef};
pub use tick::{TickEntry, TickPage, TickUser};
pub use user::{normalize_user_id, TargetUser};
