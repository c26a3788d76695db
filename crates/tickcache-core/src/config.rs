//! Application configuration management.
//!
//! Configuration is stored at `~/.config/tickcache/config.json`. Every field
//! has a default, so a missing file or a partial file both load cleanly.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "tickcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Route tick cache file name
const CACHE_FILE: &str = "route_ticks.json";

/// Default log directory, relative to the working directory
const LOG_DIR: &str = "logs";

/// Longest accepted refetch threshold, 100 years in minutes
pub const MAX_REFETCH_THRESHOLD_MINS: i64 = 100 * 365 * 24 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub cache_file: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub sync: SyncConfig,
}

/// Knobs for the sync engine. Passed explicitly to the fetcher, the sync
/// driver and the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: String,
    pub routes_path: String,
    /// Minimum minutes between API checks of the same route
    pub refetch_threshold_mins: i64,
    /// Ticks requested per page
    pub page_size: u32,
    /// Hard ceiling on pages followed for one route
    pub page_limit: u32,
    pub max_rate_limit_retries: u32,
    /// First HTTP 429 backoff; doubles on every retry
    pub initial_backoff_ms: u64,
    pub request_timeout_secs: u64,
    /// Number of users reported
    pub max_rank: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.mountainproject.com".to_string(),
            routes_path: "api/v2/routes".to_string(),
            refetch_threshold_mins: 1,
            page_size: 250,
            page_limit: 100,
            max_rate_limit_retries: 5,
            initial_backoff_ms: 1000,
            request_timeout_secs: 10,
            max_rank: 50,
        }
    }
}

impl SyncConfig {
    /// Out-of-range minutes are clamped; `validate` reports them.
    pub fn refetch_threshold(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.refetch_threshold_mins.clamp(0, MAX_REFETCH_THRESHOLD_MINS))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0..=MAX_REFETCH_THRESHOLD_MINS).contains(&self.refetch_threshold_mins) {
            bail!(
                "refetch_threshold_mins must be between 0 and {}, got {}",
                MAX_REFETCH_THRESHOLD_MINS,
                self.refetch_threshold_mins
            );
        }
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        Ok(())
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// First page of a route's tick list.
    pub fn ticks_url(&self, route_id: &str) -> String {
        format!(
            "{}/{}/{}/ticks?per_page={}&page=1",
            self.base_url.trim_end_matches('/'),
            self.routes_path.trim_matches('/'),
            route_id,
            self.page_size
        )
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Configured cache file, else the platform cache dir, else the working directory.
    pub fn cache_file(&self) -> PathBuf {
        if let Some(ref path) = self.cache_file {
            return path.clone();
        }
        dirs::cache_dir()
            .map(|dir| dir.join(APP_NAME).join(CACHE_FILE))
            .unwrap_or_else(|| PathBuf::from(CACHE_FILE))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from(LOG_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_config_defaults() {
        let sync = SyncConfig::default();
        assert_eq!(sync.page_size, 250);
        assert_eq!(sync.page_limit, 100);
        assert_eq!(sync.max_rate_limit_retries, 5);
        assert_eq!(sync.max_rank, 50);
        assert_eq!(sync.refetch_threshold(), chrono::Duration::minutes(1));
        assert_eq!(sync.initial_backoff(), Duration::from_secs(1));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let huge = SyncConfig {
            refetch_threshold_mins: i64::MAX,
            ..SyncConfig::default()
        };
        assert!(huge.validate().is_err());
        assert_eq!(
            huge.refetch_threshold(),
            chrono::Duration::minutes(MAX_REFETCH_THRESHOLD_MINS)
        );

        let negative = SyncConfig {
            refetch_threshold_mins: -5,
            ..SyncConfig::default()
        };
        assert!(negative.validate().is_err());
        assert_eq!(negative.refetch_threshold(), chrono::Duration::zero());

        let day = SyncConfig {
            refetch_threshold_mins: 1440,
            ..SyncConfig::default()
        };
        assert!(day.validate().is_ok());
        assert!(SyncConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ticks_url() {
        let sync = SyncConfig::default();
        assert_eq!(
            sync.ticks_url("105717310"),
            "https://www.mountainproject.com/api/v2/routes/105717310/ticks?per_page=250&page=1"
        );

        let custom = SyncConfig {
            base_url: "http://localhost:8080/".to_string(),
            routes_path: "/v2/routes/".to_string(),
            page_size: 10,
            ..SyncConfig::default()
        };
        assert_eq!(
            custom.ticks_url("7"),
            "http://localhost:8080/v2/routes/7/ticks?per_page=10&page=1"
        );
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"sync": {"refetch_threshold_mins": 1440}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sync.refetch_threshold_mins, 1440);
        assert_eq!(config.sync.page_size, 250);
        assert!(config.cache_file.is_none());
        assert_eq!(config.log_dir(), PathBuf::from("logs"));
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.sync, SyncConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            cache_file: Some(PathBuf::from("/tmp/ticks.json")),
            log_dir: None,
            sync: SyncConfig {
                max_rank: 10,
                ..SyncConfig::default()
            },
        };
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.cache_file(), PathBuf::from("/tmp/ticks.json"));
        assert_eq!(reloaded.sync.max_rank, 10);
    }
}
