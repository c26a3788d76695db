//! Paginated retrieval of one route's tick list.
//!
//! The fetcher walks `next_page_url` links until they run out, backing off on
//! HTTP 429 and re-requesting a page once if its body does not parse. Two
//! shortcuts avoid re-reading whole histories when a cached entry exists:
//!
//! - **Unchanged**: page 1 reports the same total as the cache. Nothing is
//!   collected and only the route's checked timestamp should move.
//! - **Small delta**: page 1 reports between 1 and `page_size` more ticks than
//!   the cache. Page 1 is kept and no further pages are requested.
//!
//! The small-delta shortcut relies on the API listing newest ticks first. If
//! that ordering ever changes, new users past page 1 are silently missed and
//! only an external consistency check would notice.

use tracing::{error, info, warn};

use crate::config::SyncConfig;
use crate::models::{RouteCacheEntry, TickEntry, TickPage};

use super::client::{PageTransport, RawPage};
use super::ApiError;

/// Result of fetching one route.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub entries: Vec<TickEntry>,
    /// Total ticks reported by the API
    pub total: i64,
    /// Remote data matches the cache; only `mp_last_checked` should change
    pub timestamp_only: bool,
}

pub struct TickFetcher<T> {
    transport: T,
    config: SyncConfig,
}

impl<T: PageTransport> TickFetcher<T> {
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch every page of a route's ticks, or as few as the cached entry allows.
    pub async fn fetch(
        &self,
        route_id: &str,
        cached: Option<&RouteCacheEntry>,
    ) -> Result<FetchOutcome, ApiError> {
        let mut outcome = FetchOutcome::default();
        let mut next_page_url = Some(self.config.ticks_url(route_id));
        let mut page_count: u32 = 0;

        while let Some(url) = next_page_url.take() {
            page_count += 1;
            if page_count > self.config.page_limit {
                info!(
                    route_id = route_id,
                    limit = self.config.page_limit,
                    url = %url,
                    "Page count exceeded limit, keeping partial tick list"
                );
                break;
            }

            info!(url = %url, "Getting ticks page");
            let page = self.fetch_page(&url).await?;
            let first_page = page.current_page.map_or(page_count == 1, |p| p == 1);

            if first_page {
                if let Some(cached) = cached {
                    if page.total == cached.last_total_mp {
                        info!(route_id = route_id, total = page.total, "Route tick total same as cached");
                        return Ok(FetchOutcome {
                            entries: Vec::new(),
                            total: page.total,
                            timestamp_only: true,
                        });
                    }
                }
            }

            outcome.total = page.total;
            outcome.entries.extend(page.data);
            next_page_url = page.next_page_url;

            if first_page {
                if let Some(cached) = cached {
                    let difference = page.total - cached.last_total_mp;
                    info!(route_id = route_id, difference = difference, "Route tick total difference");
                    if difference > 0 && difference <= i64::from(self.config.page_size) {
                        break;
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Fetch and parse one page; a body that fails to parse gets one more request.
    async fn fetch_page(&self, url: &str) -> Result<TickPage, ApiError> {
        let body = self.get_with_backoff(url).await?;
        match serde_json::from_str(&body) {
            Ok(page) => Ok(page),
            Err(e) => {
                warn!(url = url, error = %e, "Malformed ticks page, trying again");
                let body = self.get_with_backoff(url).await?;
                serde_json::from_str(&body).map_err(|source| {
                    error!(url = url, error = %source, "Ticks page malformed twice");
                    ApiError::InvalidResponse {
                        url: url.to_string(),
                        source,
                    }
                })
            }
        }
    }

    /// GET a page, sleeping `initial_backoff * 2^retry` after each HTTP 429.
    async fn get_with_backoff(&self, url: &str) -> Result<String, ApiError> {
        let mut retries: u32 = 0;

        loop {
            let RawPage { status, body } = self.transport.get_page(url).await?;

            if status == reqwest::StatusCode::OK {
                return Ok(body);
            }

            if status != reqwest::StatusCode::TOO_MANY_REQUESTS {
                error!(url = url, status = %status, "Unexpected HTTP status");
                return Err(ApiError::from_status(status, url, &body));
            }

            if retries >= self.config.max_rate_limit_retries {
                error!(url = url, retries = retries, "Exceeded max retries due to HTTP 429");
                return Err(ApiError::RateLimited {
                    url: url.to_string(),
                    retries,
                });
            }

            let wait = self.config.initial_backoff() * 2u32.saturating_pow(retries);
            warn!(url = url, retry = retries, wait_ms = wait.as_millis() as u64, "Rate limited, backing off");
            tokio::time::sleep(wait).await;
            retries += 1;
        }
    }
}
