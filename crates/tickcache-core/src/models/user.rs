use std::fmt;

use crate::error::{Error, Result};

/// Longest accepted `<id>/<name>` input.
const MAX_TARGET_INPUT_LENGTH: usize = 100;

/// Canonical string form of a user identifier.
///
/// The API reports user IDs as JSON numbers while the persisted cache keys
/// them as strings, so every ingestion point funnels through here. An all-digit
/// ID is rendered as its integer value (no leading zeros); anything else is
/// kept as the trimmed string.
pub fn normalize_user_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let digits = trimmed.trim_start_matches('0');
        if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        }
    } else {
        trimmed.to_string()
    }
}

/// The user whose tick list drives a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUser {
    pub id: String,
    pub name: String,
}

impl TargetUser {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: normalize_user_id(id),
            name: name.trim().to_string(),
        }
    }

    /// Parse `<id>/<name>` as typed into the profile box, e.g. `200123456/thomas-anderson`.
    /// Surrounding slashes are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        if input.len() > MAX_TARGET_INPUT_LENGTH {
            return Err(Error::InvalidTarget("UID/name too long".to_string()));
        }

        let mut parts = input.trim().trim_matches('/').split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(name), None) if !id.trim().is_empty() && !name.trim().is_empty() => {
                Ok(Self::new(id, name))
            }
            _ => Err(Error::InvalidTarget(format!(
                "expected <id>/<name>, got {:?}",
                input
            ))),
        }
    }
}

impl fmt::Display for TargetUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.id)
    }
}
