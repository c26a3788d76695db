//! Shared-route counts against a target user.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{normalize_user_id, CacheMap};

/// One line of the report: a user and how many of the target's routes they ticked.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedRoutes {
    pub user_id: String,
    pub name: String,
    pub count: usize,
    /// Share of the target user's own cached route count, one decimal
    pub percent: f64,
}

impl fmt::Display for SharedRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {:.1}%", self.name, self.count, self.percent)
    }
}

/// Count, per user, how many of `route_ids` they have ticked, then rank.
///
/// Ties keep the order in which users were first seen. The target user's own
/// count (routes of theirs present in the cache) is the 100% mark; it is
/// taken before truncating to `max_rank`.
pub fn aggregate(
    cache: &CacheMap,
    route_ids: &[String],
    target_user_id: &str,
    max_rank: usize,
) -> Result<Vec<SharedRoutes>> {
    let mut counts: Vec<(String, String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen_routes = HashSet::new();

    for route_id in route_ids {
        if !seen_routes.insert(route_id.as_str()) {
            continue;
        }
        let Some(entry) = cache.get(route_id) else {
            debug!(route_id = %route_id, "Route not in cache, not counted");
            continue;
        };
        for (user_id, name) in &entry.user_ticks {
            match index.get(user_id) {
                Some(&i) => counts[i].2 += 1,
                None => {
                    index.insert(user_id.clone(), counts.len());
                    counts.push((user_id.clone(), name.clone(), 1));
                }
            }
        }
    }

    let target_id = normalize_user_id(target_user_id);
    let target_total = index
        .get(&target_id)
        .map(|&i| counts[i].2)
        .ok_or_else(|| Error::TargetNotFound(target_id.clone()))?;

    // Stable: equal counts stay in encounter order
    counts.sort_by(|a, b| b.2.cmp(&a.2));

    Ok(counts
        .into_iter()
        .take(max_rank)
        .map(|(user_id, name, count)| SharedRoutes {
            user_id,
            name,
            count,
            percent: percent_of(count, target_total),
        })
        .collect())
}

/// `count / total * 100`, rounded to one decimal place with ties to even.
fn percent_of(count: usize, total: usize) -> f64 {
    let percent = count as f64 / total as f64 * 100.0;
    (percent * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RouteCacheEntry;
    use chrono::NaiveDate;

    fn cache_with<S: AsRef<str>>(routes: &[(S, Vec<(&str, &str)>)]) -> CacheMap {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        routes
            .iter()
            .map(|(route_id, users)| {
                let route_id: &str = route_id.as_ref();
                let mut entry = RouteCacheEntry::new(route_id, users.len() as i64, now);
                for (id, name) in users {
                    entry.user_ticks.insert(id.to_string(), name.to_string());
                }
                (route_id.to_string(), entry)
            })
            .collect()
    }

    fn ids(routes: &[&str]) -> Vec<String> {
        routes.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(10, 40), 25.0);
        assert_eq!(percent_of(40, 40), 100.0);
        assert_eq!(percent_of(1, 3), 33.3);
        assert_eq!(percent_of(2, 3), 66.7);
    }

    #[test]
    fn test_percent_half_rounds_to_even() {
        assert_eq!(percent_of(1, 16), 6.2);
        assert_eq!(percent_of(5, 16), 31.2);
        assert_eq!(percent_of(3, 16), 18.8);
        assert_eq!(percent_of(1, 8), 12.5);
    }

    #[test]
    fn test_aggregate_ranks_users() {
        let cache = cache_with(&[
            ("r1", vec![("100", "Me"), ("1", "A"), ("2", "B")]),
            ("r2", vec![("100", "Me"), ("2", "B")]),
            ("r3", vec![("100", "Me"), ("2", "B"), ("3", "C")]),
            ("r4", vec![("100", "Me")]),
        ]);

        let results = aggregate(&cache, &ids(&["r1", "r2", "r3", "r4"]), "100", 50).unwrap();
        let lines: Vec<String> = results.iter().map(|r| r.to_string()).collect();
        assert_eq!(lines, vec!["Me, 4, 100.0%", "B, 3, 75.0%", "A, 1, 25.0%", "C, 1, 25.0%"]);
    }

    #[test]
    fn test_percent_against_target_total() {
        let mut routes: Vec<(String, Vec<(&str, &str)>)> = Vec::new();
        for i in 0..40 {
            let mut users = vec![("100", "Me")];
            if i < 10 {
                users.push(("7", "Other"));
            }
            routes.push((format!("r{i}"), users));
        }
        let cache = cache_with(&routes);
        let route_ids: Vec<String> = routes.iter().map(|(id, _)| id.clone()).collect();

        let results = aggregate(&cache, &route_ids, "100", 50).unwrap();
        let other = results.iter().find(|r| r.user_id == "7").unwrap();
        assert_eq!(other.count, 10);
        assert_eq!(other.percent, 25.0);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let cache = cache_with(&[
            ("r1", vec![("100", "Me"), ("9", "Z")]),
            ("r2", vec![("100", "Me"), ("5", "Y")]),
        ]);
        let results = aggregate(&cache, &ids(&["r1", "r2"]), "100", 50).unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["100", "9", "5"]);
    }

    #[test]
    fn test_ties_follow_api_order_within_route() {
        use crate::cache::merge_ticks;
        use crate::models::TickEntry;

        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let entries: Vec<TickEntry> = [("100", "Me"), ("9", "Zed"), ("10", "Yan")]
            .iter()
            .map(|(id, name)| TickEntry::from_user(id, name))
            .collect();
        let mut cache = CacheMap::new();
        merge_ticks(&mut cache, "r1", "route-one", 3, &entries, now);

        let results = aggregate(&cache, &ids(&["r1"]), "100", 50).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Me", "Zed", "Yan"]);

        let top_two = aggregate(&cache, &ids(&["r1"]), "100", 2).unwrap();
        assert_eq!(top_two[1].name, "Zed");
    }

    #[test]
    fn test_truncates_to_max_rank_after_target_total() {
        let cache = cache_with(&[
            ("r1", vec![("1", "A"), ("2", "B"), ("100", "Me")]),
            ("r2", vec![("1", "A"), ("2", "B")]),
        ]);
        let results = aggregate(&cache, &ids(&["r1", "r2"]), "100", 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].percent, 200.0);
        assert!(results.iter().all(|r| r.user_id != "100"));
    }

    #[test]
    fn test_missing_and_repeated_routes() {
        let cache = cache_with(&[("r1", vec![("100", "Me"), ("1", "A")])]);
        let results = aggregate(&cache, &ids(&["r1", "r1", "gone"]), "100", 50).unwrap();
        assert_eq!(results[0].count, 1);
        assert_eq!(results[1].count, 1);
    }

    #[test]
    fn test_target_id_is_normalized() {
        let cache = cache_with(&[("r1", vec![("100", "Me")])]);
        let results = aggregate(&cache, &ids(&["r1"]), " 000100 ", 50).unwrap();
        assert_eq!(results[0].percent, 100.0);
    }

    #[test]
    fn test_unknown_target_is_error() {
        let cache = cache_with(&[("r1", vec![("1", "A")])]);
        let result = aggregate(&cache, &ids(&["r1"]), "100", 50);
        assert!(matches!(result, Err(Error::TargetNotFound(id)) if id == "100"));
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let cache = cache_with(&[
            ("r1", vec![("100", "Me"), ("1", "A"), ("2", "B"), ("3", "C")]),
            ("r2", vec![("100", "Me"), ("3", "C"), ("1", "A")]),
            ("r3", vec![("100", "Me"), ("2", "B")]),
        ]);
        let route_ids = ids(&["r3", "r1", "r2"]);
        let first = aggregate(&cache, &route_ids, "100", 50).unwrap();
        for _ in 0..5 {
            assert_eq!(aggregate(&cache, &route_ids, "100", 50).unwrap(), first);
        }
    }
}
