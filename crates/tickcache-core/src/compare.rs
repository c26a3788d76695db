//! End-to-end comparison run: route list in, ranked shared-route report out.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::aggregate::{aggregate, SharedRoutes};
use crate::api::PageTransport;
use crate::cache::CacheStore;
use crate::error::Result;
use crate::models::{dedupe_urls, RouteRef, TargetUser};
use crate::sync::{SyncSummary, TickSync};

#[derive(Debug, Clone)]
pub struct Comparison {
    pub results: Vec<SharedRoutes>,
    pub summary: SyncSummary,
    /// Whether the updated cache made it back to disk
    pub persisted: bool,
    /// Route URLs without a route ID and name
    pub skipped_routes: Vec<String>,
}

/// Sync every route on the target's tick list, save the cache, then rank
/// users by shared routes.
///
/// Fatal errors return before the cache is saved; a failed save is logged and
/// reported through `Comparison::persisted` instead.
pub async fn compare<T, I, S>(
    store: &CacheStore,
    sync: &TickSync<T>,
    target: &TargetUser,
    route_urls: I,
    now: NaiveDateTime,
) -> Result<Comparison>
where
    T: PageTransport,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let urls = dedupe_urls(route_urls);
    info!(user = %target, routes = urls.len(), "Removed duplicate routes from tick list");

    let mut routes = Vec::with_capacity(urls.len());
    let mut skipped_routes = Vec::new();
    for url in urls {
        match RouteRef::from_url(&url) {
            Some(route) => routes.push(route),
            None => {
                warn!(url = %url, "Either route ID or name is missing from URL. Skipping route.");
                skipped_routes.push(url);
            }
        }
    }

    let mut cache = store.load()?;

    info!("Getting route ticks for all routes from either cached data or API");
    let summary = sync.sync_routes(&mut cache, &routes, now).await?;

    let persisted = store.dump(&cache);

    info!("Finding user counts per route");
    let route_ids: Vec<String> = routes.into_iter().map(|r| r.id).collect();
    let results = aggregate(&cache, &route_ids, &target.id, sync.config().max_rank)?;

    Ok(Comparison {
        results,
        summary,
        persisted,
        skipped_routes,
    })
}
