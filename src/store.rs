//! Profile-scoped key-value store.
//!
//! All household data is persisted as JSON documents addressed by a
//! ([`ProfileId`], key) pair. The profile is always passed explicitly; there is
//! no process-wide "active profile". Reads never fail on bad data: a value that
//! does not decode is logged and replaced by the caller's fallback. Only database
//! failures surface as errors. The last write to a key wins.

use crate::{
    entities::{KvEntry, kv_entry},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;

const DEFAULT_PROFILE: &str = "default";

/// Identifier of a household profile. Blank names collapse to `"default"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileId(String);

impl ProfileId {
    /// Creates a profile id, trimming whitespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Self(DEFAULT_PROFILE.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The profile name as stored in the database
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self(DEFAULT_PROFILE.to_string())
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

async fn find_entry<C>(db: &C, profile: &ProfileId, key: &str) -> Result<Option<kv_entry::Model>>
where
    C: ConnectionTrait,
{
    KvEntry::find()
        .filter(kv_entry::Column::Profile.eq(profile.as_str()))
        .filter(kv_entry::Column::Key.eq(key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads the raw JSON stored under `key`.
///
/// Returns `Ok(None)` when the key was never written or its contents are not
/// valid JSON.
pub async fn load_raw<C>(
    db: &C,
    profile: &ProfileId,
    key: &str,
) -> Result<Option<serde_json::Value>>
where
    C: ConnectionTrait,
{
    let Some(entry) = find_entry(db, profile, key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&entry.value) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::error!(profile = %profile, key, "Failed to parse stored value: {e}");
            Ok(None)
        }
    }
}

/// Loads and decodes the value under `key`, returning `fallback` when the key is
/// missing or does not decode as `T`.
pub async fn load<T, C>(db: &C, profile: &ProfileId, key: &str, fallback: T) -> Result<T>
where
    T: DeserializeOwned,
    C: ConnectionTrait,
{
    let Some(raw) = load_raw(db, profile, key).await? else {
        return Ok(fallback);
    };

    match serde_json::from_value(raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::error!(profile = %profile, key, "Stored value has unexpected shape: {e}");
            Ok(fallback)
        }
    }
}

/// Stores `value` under `key`, replacing any previous value.
pub async fn save<T, C>(db: &C, profile: &ProfileId, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    C: ConnectionTrait,
{
    let encoded = serde_json::to_string(value)?;
    let now = Utc::now().naive_utc();

    if let Some(entry) = find_entry(db, profile, key).await? {
        let mut active_model: kv_entry::ActiveModel = entry.into();
        active_model.value = Set(encoded);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_entry = kv_entry::ActiveModel {
            profile: Set(profile.as_str().to_string()),
            key: Set(key.to_string()),
            value: Set(encoded),
            updated_at: Set(now),
            ..Default::default()
        };
        new_entry.insert(db).await?;
    }

    tracing::trace!(profile = %profile, key, "Saved value");
    Ok(())
}

/// Lists every key stored for a profile, alphabetically.
pub async fn list_keys<C>(db: &C, profile: &ProfileId) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    let entries = KvEntry::find()
        .filter(kv_entry::Column::Profile.eq(profile.as_str()))
        .order_by_asc(kv_entry::Column::Key)
        .all(db)
        .await?;

    Ok(entries.into_iter().map(|entry| entry.key).collect())
}

/// Removes a single key. Returns whether anything was deleted.
pub async fn remove<C>(db: &C, profile: &ProfileId, key: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = KvEntry::delete_many()
        .filter(kv_entry::Column::Profile.eq(profile.as_str()))
        .filter(kv_entry::Column::Key.eq(key))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Removes every key of a profile. Returns the number of keys deleted.
pub async fn clear_profile<C>(db: &C, profile: &ProfileId) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = KvEntry::delete_many()
        .filter(kv_entry::Column::Profile.eq(profile.as_str()))
        .exec(db)
        .await?;

    tracing::info!(profile = %profile, "Cleared {} stored keys", result.rows_affected);
    Ok(result.rows_affected)
}
