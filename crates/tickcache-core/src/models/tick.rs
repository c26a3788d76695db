use serde::{Deserialize, Deserializer};

use super::user::normalize_user_id;

/// One page of `GET /routes/{id}/ticks`.
#[derive(Debug, Clone, Deserialize)]
pub struct TickPage {
    #[serde(default)]
    pub current_page: Option<u32>,
    pub total: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<TickEntry>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub next_page_url: Option<String>,
}

/// A single logged ascent. Only the user matters here; the API also sends
/// dates, styles and notes which are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickEntry {
    #[serde(default, deserialize_with = "known_user")]
    pub user: Option<TickUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TickUser {
    #[serde(deserialize_with = "user_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_blank")]
    pub name: String,
}

impl TickEntry {
    pub fn from_user(id: &str, name: &str) -> Self {
        Self {
            user: Some(TickUser {
                id: normalize_user_id(id),
                name: name.to_string(),
            }),
        }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

/// Accepts a numeric or string ID and normalizes it.
fn user_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Uint(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
        RawId::Text(s) => normalize_user_id(&s),
    })
}

/// Deleted and private accounts come back as `"user": false` (or null).
fn known_user<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TickUser>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeUser {
        User(TickUser),
        Other(serde_json::Value),
    }

    Ok(match Option::<MaybeUser>::deserialize(deserializer)? {
        Some(MaybeUser::User(user)) => Some(user),
        _ => None,
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<TickEntry>, D::Error> {
    Ok(Option::<Vec<TickEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}
