//! Error types for the sync engine.
//!
//! Every variant here is fatal to a run; recoverable conditions are logged where they occur.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read cache file {}: {source}", .path.display())]
    CacheUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file {} is corrupt: {source}", .path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid user: {0}")]
    InvalidTarget(String),

    #[error("User {0} not found in any cached route tick list")]
    TargetNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
