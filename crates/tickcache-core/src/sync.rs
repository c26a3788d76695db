//! Per-route cache synchronization.
//!
//! Routes are handled strictly one after another: staleness check, fetch,
//! then merge or timestamp touch. The first fatal error stops the run.

use chrono::NaiveDateTime;
use tracing::info;

use crate::api::{ApiError, PageTransport, TickFetcher};
use crate::cache::{merge_ticks, should_refetch, touch_checked};
use crate::config::SyncConfig;
use crate::models::{CacheMap, RouteRef};

/// What happened to one route during a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    /// Checked recently enough; no request made
    Fresh,
    /// API total matched the cache; only the checked timestamp moved
    Unchanged,
    /// Tick data merged into the cache
    Updated { new_users: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub fresh: usize,
    pub unchanged: usize,
    pub updated: usize,
    pub new_users: usize,
}

impl SyncSummary {
    fn record(&mut self, status: RouteStatus) {
        match status {
            RouteStatus::Fresh => self.fresh += 1,
            RouteStatus::Unchanged => self.unchanged += 1,
            RouteStatus::Updated { new_users } => {
                self.updated += 1;
                self.new_users += new_users;
            }
        }
    }

    pub fn total(&self) -> usize {
        self.fresh + self.unchanged + self.updated
    }
}

pub struct TickSync<T> {
    fetcher: TickFetcher<T>,
}

impl<T: PageTransport> TickSync<T> {
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self {
            fetcher: TickFetcher::new(transport, config),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        self.fetcher.config()
    }

    pub fn fetcher(&self) -> &TickFetcher<T> {
        &self.fetcher
    }

    /// Bring one route's cache entry up to date.
    pub async fn sync_route(
        &self,
        cache: &mut CacheMap,
        route: &RouteRef,
        now: NaiveDateTime,
    ) -> Result<RouteStatus, ApiError> {
        let threshold = self.config().refetch_threshold();
        if !should_refetch(cache.get(&route.id), now, threshold) {
            info!(route_id = %route.id, "Last checked within time limit, using cached data");
            return Ok(RouteStatus::Fresh);
        }

        let outcome = self.fetcher.fetch(&route.id, cache.get(&route.id)).await?;

        if outcome.timestamp_only && touch_checked(cache, &route.id, now) {
            info!(route_id = %route.id, "Updating last checked timestamp only");
            return Ok(RouteStatus::Unchanged);
        }

        let stats = merge_ticks(cache, &route.id, &route.name, outcome.total, &outcome.entries, now);
        Ok(RouteStatus::Updated {
            new_users: stats.new_users,
        })
    }

    /// Sync every route in order, logging progress.
    pub async fn sync_routes(
        &self,
        cache: &mut CacheMap,
        routes: &[RouteRef],
        now: NaiveDateTime,
    ) -> Result<SyncSummary, ApiError> {
        let mut summary = SyncSummary::default();
        let count = routes.len();

        for (i, route) in routes.iter().enumerate() {
            info!(progress = %format!("{}/{}", i + 1, count), url = %route.url, "Syncing route");
            let status = self.sync_route(cache, route, now).await?;
            summary.record(status);
        }

        info!(
            fresh = summary.fresh,
            unchanged = summary.unchanged,
            updated = summary.updated,
            new_users = summary.new_users,
            "Route sync finished"
        );
        Ok(summary)
    }
}
