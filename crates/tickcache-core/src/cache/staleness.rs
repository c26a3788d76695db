use chrono::{Duration, NaiveDateTime};

use crate::models::RouteCacheEntry;

/// Whether a route should be checked against the API again.
///
/// Unknown routes and entries with a missing or unreadable `mp_last_checked`
/// are always refetched. Otherwise the cache is reused while less than
/// `threshold` has passed since the last check; a check stamped in the future
/// counts as fresh.
pub fn should_refetch(entry: Option<&RouteCacheEntry>, now: NaiveDateTime, threshold: Duration) -> bool {
    match entry.and_then(RouteCacheEntry::last_checked) {
        Some(last_checked) => now - last_checked >= threshold,
        None => true,
    }
}
