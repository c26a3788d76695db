//! Remote route ticks API.
//!
//! - `TickClient`: reqwest transport implementing `PageTransport`
//! - `TickFetcher`: paginated retrieval of one route with rate-limit backoff
//!   and the unchanged / small-delta shortcuts
//!
//! The API needs no authentication. Pages look like
//! `{"current_page": 1, "total": 812, "data": [...], "next_page_url": "..."}`.

pub mod client;
pub mod error;
pub mod fetcher;

pub use client::{PageTransport, RawPage, TickClient};
pub use error::ApiError;
pub use fetcher::{FetchOutcome, TickFetcher};
