//! Milk ledger - daily milk deliveries.
//!
//! Each entry records liters and the price per liter on a date, optionally tied
//! to a milkman. Entries without a milkman are billed under the "unassigned"
//! bucket by the monthly statement.

use crate::{
    core::{
        helper, lenient,
        month::{self, MonthKey},
    },
    errors::{Error, Result},
    store::{self, ProfileId},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};

/// Store key holding the milk entries
pub const MILK_KEY: &str = "milk";

/// A single milk delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilkEntry {
    /// Opaque id
    #[serde(deserialize_with = "lenient::required_text")]
    pub id: String,
    /// `YYYY-MM-DD` as stored
    #[serde(deserialize_with = "lenient::required_text")]
    pub date: String,
    /// Milkman who delivered, `None` for general purchases
    #[serde(default, deserialize_with = "lenient::optional_id")]
    pub helper_id: Option<String>,
    /// Quantity delivered
    #[serde(default, deserialize_with = "lenient::number")]
    pub liters: f64,
    /// Price charged per liter for this delivery
    #[serde(default, deserialize_with = "lenient::number")]
    pub price_per_liter: f64,
}

impl MilkEntry {
    /// Cost of this delivery
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.liters * self.price_per_liter
    }
}

/// Input for [`add_milk_entry`]
#[derive(Debug, Clone)]
pub struct NewMilkEntry {
    /// Delivery date
    pub date: NaiveDate,
    /// Milkman, if any
    pub helper_id: Option<String>,
    /// Liters, must be positive
    pub liters: f64,
    /// Price per liter; defaults to the milkman's default price, else 0
    pub price_per_liter: Option<f64>,
}

/// Generates a new opaque milk entry id
#[must_use]
pub fn generate_milk_id() -> String {
    format!("m_{}", uuid::Uuid::new_v4().simple())
}

fn validate_liters(liters: f64) -> Result<f64> {
    if !liters.is_finite() || liters <= 0.0 {
        return Err(Error::Validation {
            message: format!("Liters must be greater than zero, got {liters}"),
        });
    }
    Ok(liters)
}

fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::Validation {
            message: format!("Price per liter must be a non-negative number, got {price}"),
        });
    }
    Ok(price)
}

/// Lists every milk entry of a profile in stored order.
pub async fn list_milk_entries<C>(db: &C, profile: &ProfileId) -> Result<Vec<MilkEntry>>
where
    C: ConnectionTrait,
{
    let raw = store::load_raw(db, profile, MILK_KEY).await?;
    Ok(lenient::decode_records(raw, MILK_KEY))
}

async fn save_milk_entries<C>(db: &C, profile: &ProfileId, entries: &[MilkEntry]) -> Result<()>
where
    C: ConnectionTrait,
{
    store::save(db, profile, MILK_KEY, entries).await
}

/// Entries dated within `month`, newest first.
pub async fn milk_entries_for_month<C>(
    db: &C,
    profile: &ProfileId,
    month: &MonthKey,
) -> Result<Vec<MilkEntry>>
where
    C: ConnectionTrait,
{
    let mut entries: Vec<MilkEntry> = list_milk_entries(db, profile)
        .await?
        .into_iter()
        .filter(|entry| month.contains(&entry.date))
        .collect();
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(entries)
}

/// Validates and appends a milk entry.
pub async fn add_milk_entry(
    db: &DatabaseConnection,
    profile: &ProfileId,
    new_entry: NewMilkEntry,
) -> Result<MilkEntry> {
    let liters = validate_liters(new_entry.liters)?;
    let helper_id = new_entry
        .helper_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let txn = db.begin().await?;

    let price_per_liter = match new_entry.price_per_liter {
        Some(price) => validate_price(price)?,
        None => match &helper_id {
            Some(id) => helper::find_helper(&txn, profile, id)
                .await?
                .map_or(0.0, |h| h.default_price_per_liter),
            None => 0.0,
        },
    };

    let entry = MilkEntry {
        id: generate_milk_id(),
        date: month::format_date(new_entry.date),
        helper_id,
        liters,
        price_per_liter,
    };

    let mut entries = list_milk_entries(&txn, profile).await?;
    entries.push(entry.clone());
    save_milk_entries(&txn, profile, &entries).await?;
    txn.commit().await?;

    tracing::debug!(profile = %profile, entry_id = %entry.id, "Added milk entry of {:.1} L", entry.liters);
    Ok(entry)
}

fn validate_entry(entry: &MilkEntry) -> Result<()> {
    if entry.id.trim().is_empty() {
        return Err(Error::Validation {
            message: "Milk entry id cannot be empty".to_string(),
        });
    }
    month::parse_date(&entry.date)?;
    validate_liters(entry.liters)?;
    validate_price(entry.price_per_liter)?;
    Ok(())
}

/// Stores an entry, replacing the one with the same id or appending it.
pub async fn upsert_milk_entry(
    db: &DatabaseConnection,
    profile: &ProfileId,
    entry: MilkEntry,
) -> Result<()> {
    validate_entry(&entry)?;

    let txn = db.begin().await?;
    let mut entries = list_milk_entries(&txn, profile).await?;

    if let Some(existing) = entries.iter_mut().find(|e| e.id == entry.id) {
        *existing = entry;
    } else {
        entries.push(entry);
    }

    save_milk_entries(&txn, profile, &entries).await?;
    txn.commit().await?;
    Ok(())
}

/// Replaces a stored entry with the same id.
///
/// # Errors
/// [`Error::EntryNotFound`] when no entry has that id.
pub async fn update_milk_entry(
    db: &DatabaseConnection,
    profile: &ProfileId,
    entry: MilkEntry,
) -> Result<()> {
    validate_entry(&entry)?;

    let txn = db.begin().await?;
    let mut entries = list_milk_entries(&txn, profile).await?;

    let slot = entries
        .iter_mut()
        .find(|e| e.id == entry.id)
        .ok_or_else(|| Error::EntryNotFound {
            id: entry.id.clone(),
        })?;
    *slot = entry;

    save_milk_entries(&txn, profile, &entries).await?;
    txn.commit().await?;
    Ok(())
}

/// Deletes an entry. Returns whether anything was removed.
pub async fn delete_milk_entry(db: &DatabaseConnection, profile: &ProfileId, id: &str) -> Result<bool> {
    let txn = db.begin().await?;
    let mut entries = list_milk_entries(&txn, profile).await?;
    let before = entries.len();
    entries.retain(|e| e.id != id);
    let removed = entries.len() < before;

    if removed {
        save_milk_entries(&txn, profile, &entries).await?;
    }
    txn.commit().await?;
    Ok(removed)
}
