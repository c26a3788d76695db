use chrono::NaiveDateTime;
use indexmap::IndexMap;
use tracing::debug;

use crate::models::{format_timestamp, CacheMap, RouteCacheEntry, TickEntry};

/// What a merge changed in one route's `user_ticks`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Users not previously recorded for the route
    pub new_users: usize,
    /// Known users whose display name changed
    pub renamed_users: usize,
}

/// Merge freshly fetched ticks into the cache entry for `route_id`.
///
/// Anonymous ticks are skipped. The merge is additive: users missing from
/// `entries` stay in the cache, and a repeated user's name is refreshed.
/// Merging the same ticks twice leaves the same entry as merging once.
pub fn merge_ticks(
    cache: &mut CacheMap,
    route_id: &str,
    route_name: &str,
    total: i64,
    entries: &[TickEntry],
    now: NaiveDateTime,
) -> MergeStats {
    // A repeated user keeps its first position and its last name
    let delta: IndexMap<&str, &str> = entries
        .iter()
        .filter_map(|tick| tick.user.as_ref())
        .map(|user| (user.id.as_str(), user.name.as_str()))
        .collect();

    let timestamp = format_timestamp(now);
    let entry = cache
        .entry(route_id.to_string())
        .or_insert_with(|| RouteCacheEntry::new(route_name, total, now));

    entry.route_name = route_name.to_string();
    entry.last_total_mp = total;
    entry.cache_last_updated = timestamp.clone();
    entry.mp_last_checked = timestamp;

    let mut stats = MergeStats::default();
    for (id, name) in delta {
        match entry.user_ticks.insert(id.to_string(), name.to_string()) {
            None => stats.new_users += 1,
            Some(previous) if previous != name => stats.renamed_users += 1,
            Some(_) => {}
        }
    }

    debug!(
        route_id = route_id,
        new_users = stats.new_users,
        renamed_users = stats.renamed_users,
        users = entry.user_ticks.len(),
        "Merged route ticks"
    );
    stats
}

/// Record that the API was checked without new data. Unknown routes are left alone.
pub fn touch_checked(cache: &mut CacheMap, route_id: &str, now: NaiveDateTime) -> bool {
    match cache.get_mut(route_id) {
        Some(entry) => {
            entry.mp_last_checked = format_timestamp(now);
            true
        }
        None => false,
    }
}
