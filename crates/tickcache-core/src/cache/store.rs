use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::models::{normalize_user_id, CacheMap};

/// The route tick cache file. Loaded once per run and dumped once at the end.
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache. A missing file is an empty cache; an unreadable or
    /// corrupt one is an error, so a later dump cannot clobber good data.
    pub fn load(&self) -> Result<CacheMap> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Cache file not found, starting with empty cache");
                return Ok(CacheMap::new());
            }
            Err(source) => {
                return Err(Error::CacheUnreadable {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut cache: CacheMap =
            serde_json::from_str(&contents).map_err(|source| Error::CacheCorrupt {
                path: self.path.clone(),
                source,
            })?;

        for entry in cache.values_mut() {
            if entry.user_ticks.keys().any(|id| normalize_user_id(id) != *id) {
                entry.user_ticks = std::mem::take(&mut entry.user_ticks)
                    .into_iter()
                    .map(|(id, name)| (normalize_user_id(&id), name))
                    .collect();
            }
        }

        info!(path = %self.path.display(), routes = cache.len(), "Loaded route tick cache");
        Ok(cache)
    }

    /// Write the cache back, pretty-printed. Failures are logged and
    /// swallowed; returns whether the cache was saved.
    pub fn dump(&self, cache: &CacheMap) -> bool {
        match self.write(cache) {
            Ok(()) => {
                info!(path = %self.path.display(), routes = cache.len(), "Saved route tick cache");
                true
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Not saving new route data");
                false
            }
        }
    }

    fn write(&self, cache: &CacheMap) -> std::io::Result<()> {
        let mut json = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
        cache.serialize(&mut serializer)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("json.tmp");
        let result = fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(&json)?;
            file.sync_all()?;
            fs::rename(&temp_path, &self.path)
        });
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }
}
