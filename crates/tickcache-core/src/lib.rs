//! Core library for tickcache.
//!
//! Keeps a local cache of which users have ticked which climbing routes,
//! synchronized from the paginated route ticks API, and ranks the users who
//! share the most routes with a given climber.
//!
//! - `api`: HTTP transport and the paginated tick fetcher
//! - `cache`: cache file, staleness check, merge
//! - `sync`: per-route synchronization driver
//! - `aggregate`: shared-route ranking
//! - `compare`: the full run, start to finish
//! - `config`: configuration file and sync settings

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod models;
pub mod sync;

pub use aggregate::{aggregate, SharedRoutes};
pub use api::{ApiError, TickClient};
pub use cache::CacheStore;
pub use compare::{compare, Comparison};
pub use config::{Config, SyncConfig};
pub use error::{Error, Result};
pub use models::{RouteRef, TargetUser};
pub use sync::{RouteStatus, SyncSummary, TickSync};
