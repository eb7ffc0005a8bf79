//! Profile backups.
//!
//! A backup is every stored key of a profile wrapped with a small header.
//! Restoring accepts either that wrapped payload or a bare `{ key: value }`
//! object and writes each key as-is, overwriting what is stored.

use crate::{
    core::month,
    errors::{Error, Result},
    store::{self, ProfileId},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Application name written into backups
pub const BACKUP_APP: &str = "GharKhata";
/// Current backup format version
pub const BACKUP_VERSION: u32 = 1;

/// Exported contents of one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPayload {
    /// Always [`BACKUP_APP`]
    pub app: String,
    /// Format version
    pub version: u32,
    /// RFC 3339 export time
    pub exported_at: String,
    /// Profile the data came from
    pub profile: String,
    /// Every stored key and its JSON value
    pub data: Map<String, Value>,
}

impl BackupPayload {
    /// Pretty-printed JSON for download
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// File name for a backup taken on `date`
#[must_use]
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("gharkhata-backup-{}.json", month::format_date(date))
}

/// Collects every stored key of a profile. Unreadable values export as `null`.
pub async fn export_profile<C>(db: &C, profile: &ProfileId) -> Result<BackupPayload>
where
    C: ConnectionTrait,
{
    let mut data = Map::new();
    for key in store::list_keys(db, profile).await? {
        let value = store::load_raw(db, profile, &key).await?.unwrap_or(Value::Null);
        data.insert(key, value);
    }

    tracing::info!(profile = %profile, keys = data.len(), "Exported profile backup");
    Ok(BackupPayload {
        app: BACKUP_APP.to_string(),
        version: BACKUP_VERSION,
        exported_at: Utc::now().to_rfc3339(),
        profile: profile.as_str().to_string(),
        data,
    })
}

/// Extracts the key/value data from backup file contents.
///
/// # Errors
/// [`Error::Serialization`] for invalid JSON, [`Error::Validation`] when the
/// document is not an object.
pub fn parse_backup(contents: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(contents)? {
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Object(data)) => Ok(data),
            Some(other) => {
                // A bare object that happens to store a "data" key
                object.insert("data".to_string(), other);
                Ok(object)
            }
            None => Ok(object),
        },
        _ => Err(Error::Validation {
            message: "Backup file must contain a JSON object".to_string(),
        }),
    }
}

/// Writes every key of `data` into the profile. Returns the number of keys written.
pub async fn restore_profile(
    db: &DatabaseConnection,
    profile: &ProfileId,
    data: &Map<String, Value>,
) -> Result<usize> {
    let txn = db.begin().await?;
    for (key, value) in data {
        store::save(&txn, profile, key, value).await?;
    }
    txn.commit().await?;

    tracing::info!(profile = %profile, keys = data.len(), "Restored profile backup");
    Ok(data.len())
}

/// Deletes all stored data of a profile. Returns the number of keys removed.
pub async fn clear_profile(db: &DatabaseConnection, profile: &ProfileId) -> Result<u64> {
    let txn = db.begin().await?;
    let removed = store::clear_profile(&txn, profile).await?;
    txn.commit().await?;
    Ok(removed)
}
