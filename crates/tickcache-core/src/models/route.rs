use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Timestamp format used in the persisted cache file (local wall-clock time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Route ID → cached tick data. Ordered so dumps are stable between runs.
pub type CacheMap = BTreeMap<String, RouteCacheEntry>;

/// Everything known about who has ticked one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCacheEntry {
    #[serde(default)]
    pub route_name: String,
    /// Tick total the API reported at the last fetch
    #[serde(default)]
    pub last_total_mp: i64,
    /// When `user_ticks` last changed
    #[serde(default)]
    pub cache_last_updated: String,
    /// When the API was last asked, whether or not anything changed
    #[serde(default)]
    pub mp_last_checked: String,
    /// User ID → display name, in the order users were first seen. Only ever grows.
    #[serde(default)]
    pub user_ticks: IndexMap<String, String>,
}

impl RouteCacheEntry {
    pub fn new(route_name: &str, total: i64, now: NaiveDateTime) -> Self {
        let timestamp = format_timestamp(now);
        Self {
            route_name: route_name.to_string(),
            last_total_mp: total,
            cache_last_updated: timestamp.clone(),
            mp_last_checked: timestamp,
            user_ticks: IndexMap::new(),
        }
    }

    pub fn last_checked(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.mp_last_checked)
    }

    pub fn last_updated(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.cache_last_updated)
    }
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
}

/// A route taken from a user's tick list, e.g.
/// `https://www.mountainproject.com/route/105717310/moby-grape`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRef {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl RouteRef {
    /// Returns None unless the path carries both the route ID and name slug.
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url.trim()).ok()?;
        let mut segments = parsed.path_segments()?;
        let _kind = segments.next().filter(|s| !s.is_empty())?;
        let id = segments.next().filter(|s| !s.is_empty())?;
        let name = segments.next().filter(|s| !s.is_empty())?;

        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.trim().to_string(),
        })
    }
}

/// Drop repeated URLs, keeping the first occurrence of each.
pub fn dedupe_urls<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    urls.into_iter()
        .map(|u| u.as_ref().trim().to_string())
        .filter(|u| !u.is_empty() && seen.insert(u.clone()))
        .collect()
}
