//! Helper registry - maids, milkmen, and other household helpers.
//!
//! Helpers are stored as one JSON list per profile under the `helpers` key.
//! Deleting a helper removes only the registry record; attendance, milk, and
//! payment history that reference the id are kept and show up as "Unknown".

use crate::{
    config::settings::Settings,
    core::{lenient, month},
    errors::{Error, Result},
    store::{self, ProfileId},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Store key holding the helper list
pub const HELPERS_KEY: &str = "helpers";

/// What a helper does for the household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelperRole {
    /// Paid a salary based on attendance
    Maid,
    /// Paid through the milk ledger only, never a salary
    Milkman,
    /// Any other salaried helper
    #[serde(other)]
    Other,
}

impl HelperRole {
    fn from_label(label: &str) -> Self {
        match label {
            "Maid" => Self::Maid,
            "Milkman" => Self::Milkman,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for HelperRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Maid => "Maid",
            Self::Milkman => "Milkman",
            Self::Other => "Other",
        })
    }
}

/// How a helper's salary accrues.
///
/// For `Daily` helpers the `monthly_salary` field holds the per-day rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentType {
    /// Salary pro-rated by present days over recorded days
    #[default]
    Monthly,
    /// Day rate multiplied by present days
    #[serde(other)]
    Daily,
}

impl PaymentType {
    fn from_label(label: &str) -> Self {
        if label == "Monthly" {
            Self::Monthly
        } else {
            Self::Daily
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Monthly => "Monthly",
            Self::Daily => "Daily",
        })
    }
}

fn lenient_role<'de, D>(deserializer: D) -> std::result::Result<HelperRole, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => HelperRole::from_label(&s),
        _ => HelperRole::Other,
    })
}

fn lenient_payment_type<'de, D>(deserializer: D) -> std::result::Result<PaymentType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => PaymentType::from_label(&s),
        _ => PaymentType::Daily,
    })
}

// Stored records only count as monthly when they say so
const fn stored_payment_type() -> PaymentType {
    PaymentType::Daily
}

const fn default_role() -> HelperRole {
    HelperRole::Other
}

/// A household helper record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Helper {
    /// Opaque id, generated at creation and never reused
    #[serde(deserialize_with = "lenient::required_text")]
    pub id: String,
    /// Display name
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Maid, Milkman, or Other
    #[serde(default = "default_role", deserialize_with = "lenient_role")]
    pub role: HelperRole,
    /// Monthly salary, or the day rate for `Daily` helpers
    #[serde(default, deserialize_with = "lenient::number")]
    pub monthly_salary: f64,
    /// Price pre-filled for this milkman's milk entries
    #[serde(default, deserialize_with = "lenient::number")]
    pub default_price_per_liter: f64,
    /// Monthly or Daily
    #[serde(default = "stored_payment_type", deserialize_with = "lenient_payment_type")]
    pub payment_type: PaymentType,
    /// `YYYY-MM-DD` the helper started working
    #[serde(default, deserialize_with = "lenient::text")]
    pub start_date: String,
}

impl Helper {
    /// Whether the helper earns a salary (everyone except milkmen)
    #[must_use]
    pub fn is_salaried(&self) -> bool {
        self.role != HelperRole::Milkman
    }
}

/// Input for [`create_helper`]
#[derive(Debug, Clone)]
pub struct NewHelper {
    /// Display name, must not be blank
    pub name: String,
    /// Maid, Milkman, or Other
    pub role: HelperRole,
    /// Monthly salary or day rate, must be finite and non-negative
    pub monthly_salary: f64,
    /// Default milk price, must be finite and non-negative
    pub default_price_per_liter: f64,
    /// Monthly or Daily
    pub payment_type: PaymentType,
    /// Defaults to today
    pub start_date: Option<NaiveDate>,
}

/// Partial edit for [`update_helper`]; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct HelperUpdate {
    /// New display name
    pub name: Option<String>,
    /// New role
    pub role: Option<HelperRole>,
    /// New monthly salary or day rate
    pub monthly_salary: Option<f64>,
    /// New default milk price
    pub default_price_per_liter: Option<f64>,
    /// New payment type
    pub payment_type: Option<PaymentType>,
    /// New start date
    pub start_date: Option<NaiveDate>,
}

impl HelperUpdate {
    /// Whether the update changes nothing
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.monthly_salary.is_none()
            && self.default_price_per_liter.is_none()
            && self.payment_type.is_none()
            && self.start_date.is_none()
    }
}

/// Generates a new opaque helper id
#[must_use]
pub fn generate_helper_id() -> String {
    format!("h_{}", uuid::Uuid::new_v4().simple())
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            message: "Helper name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_money(label: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation {
            message: format!("{label} must be a non-negative number, got {value}"),
        });
    }
    Ok(value)
}

/// Lists every helper of a profile in stored order.
pub async fn list_helpers<C>(db: &C, profile: &ProfileId) -> Result<Vec<Helper>>
where
    C: ConnectionTrait,
{
    let raw = store::load_raw(db, profile, HELPERS_KEY).await?;
    Ok(lenient::decode_records(raw, HELPERS_KEY))
}

async fn save_helpers<C>(db: &C, profile: &ProfileId, helpers: &[Helper]) -> Result<()>
where
    C: ConnectionTrait,
{
    store::save(db, profile, HELPERS_KEY, helpers).await
}

/// Finds a helper by id.
pub async fn find_helper<C>(db: &C, profile: &ProfileId, id: &str) -> Result<Option<Helper>>
where
    C: ConnectionTrait,
{
    Ok(list_helpers(db, profile)
        .await?
        .into_iter()
        .find(|helper| helper.id == id))
}

/// Finds the first helper whose name matches, ignoring case and surrounding
/// whitespace.
pub async fn find_helper_by_name<C>(
    db: &C,
    profile: &ProfileId,
    name: &str,
) -> Result<Option<Helper>>
where
    C: ConnectionTrait,
{
    let wanted = name.trim().to_lowercase();
    Ok(list_helpers(db, profile)
        .await?
        .into_iter()
        .find(|helper| helper.name.trim().to_lowercase() == wanted))
}

/// Inserts a helper, or replaces the stored helper with the same id.
pub async fn upsert_helper(db: &DatabaseConnection, profile: &ProfileId, helper: Helper) -> Result<()> {
    if helper.id.trim().is_empty() {
        return Err(Error::Validation {
            message: "Helper id cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;
    let mut helpers = list_helpers(&txn, profile).await?;

    if let Some(existing) = helpers.iter_mut().find(|h| h.id == helper.id) {
        *existing = helper;
    } else {
        helpers.push(helper);
    }

    save_helpers(&txn, profile, &helpers).await?;
    txn.commit().await?;
    Ok(())
}

/// Validates and registers a new helper.
pub async fn create_helper(
    db: &DatabaseConnection,
    profile: &ProfileId,
    new_helper: NewHelper,
) -> Result<Helper> {
    let helper = Helper {
        id: generate_helper_id(),
        name: validate_name(&new_helper.name)?,
        role: new_helper.role,
        monthly_salary: validate_money("Salary", new_helper.monthly_salary)?,
        default_price_per_liter: validate_money(
            "Price per liter",
            new_helper.default_price_per_liter,
        )?,
        payment_type: new_helper.payment_type,
        start_date: month::format_date(new_helper.start_date.unwrap_or_else(month::today)),
    };

    upsert_helper(db, profile, helper.clone()).await?;
    tracing::info!(profile = %profile, helper_id = %helper.id, "Registered helper '{}'", helper.name);
    Ok(helper)
}

/// Applies a partial edit to an existing helper.
pub async fn update_helper(
    db: &DatabaseConnection,
    profile: &ProfileId,
    id: &str,
    update: HelperUpdate,
) -> Result<Helper> {
    let txn = db.begin().await?;
    let mut helpers = list_helpers(&txn, profile).await?;

    let helper = helpers
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or_else(|| Error::HelperNotFound { id: id.to_string() })?;

    if let Some(name) = update.name {
        helper.name = validate_name(&name)?;
    }
    if let Some(role) = update.role {
        helper.role = role;
    }
    if let Some(salary) = update.monthly_salary {
        helper.monthly_salary = validate_money("Salary", salary)?;
    }
    if let Some(price) = update.default_price_per_liter {
        helper.default_price_per_liter = validate_money("Price per liter", price)?;
    }
    if let Some(payment_type) = update.payment_type {
        helper.payment_type = payment_type;
    }
    if let Some(start_date) = update.start_date {
        helper.start_date = month::format_date(start_date);
    }

    let updated = helper.clone();
    save_helpers(&txn, profile, &helpers).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Removes a helper from the registry. History referencing the id is kept.
///
/// Returns whether a helper was removed.
pub async fn delete_helper(db: &DatabaseConnection, profile: &ProfileId, id: &str) -> Result<bool> {
    let txn = db.begin().await?;
    let mut helpers = list_helpers(&txn, profile).await?;
    let before = helpers.len();
    helpers.retain(|h| h.id != id);
    let removed = helpers.len() < before;

    if removed {
        save_helpers(&txn, profile, &helpers).await?;
        tracing::info!(profile = %profile, helper_id = id, "Deleted helper");
    }
    txn.commit().await?;
    Ok(removed)
}

/// Registers a milkman with just a name. Returns `None` for a blank name.
pub async fn quick_add_milkman(
    db: &DatabaseConnection,
    profile: &ProfileId,
    name: &str,
) -> Result<Option<Helper>> {
    if name.trim().is_empty() {
        return Ok(None);
    }

    create_helper(
        db,
        profile,
        NewHelper {
            name: name.to_string(),
            role: HelperRole::Milkman,
            monthly_salary: 0.0,
            default_price_per_liter: 0.0,
            payment_type: PaymentType::Monthly,
            start_date: None,
        },
    )
    .await
    .map(Some)
}

/// Creates the helpers listed in the settings when the profile has none yet.
///
/// Returns the number of helpers created.
pub async fn seed_helpers(
    db: &DatabaseConnection,
    profile: &ProfileId,
    settings: &Settings,
) -> Result<usize> {
    if settings.helpers.is_empty() || !list_helpers(db, profile).await?.is_empty() {
        return Ok(0);
    }

    for seed in &settings.helpers {
        create_helper(
            db,
            profile,
            NewHelper {
                name: seed.name.clone(),
                role: seed.role,
                monthly_salary: seed.monthly_salary,
                default_price_per_liter: seed.default_price_per_liter,
                payment_type: seed.payment_type,
                start_date: None,
            },
        )
        .await?;
    }

    Ok(settings.helpers.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::settings::HelperSeed;
    use crate::test_utils::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_list_helpers() -> Result<()> {
        let (db, profile) = setup_profile().await?;

        let maid = create_test_maid(&db, &profile, "Sunita", 3000.0).await?;
        let milkman = create_test_milkman(&db, &profile, "Ramesh", 56.0).await?;

        let helpers = list_helpers(&db, &profile).await?;
        assert_eq!(helpers.len(), 2);
        assert_eq!(helpers[0].id, maid.id);
        assert_eq!(helpers[1].id, milkman.id);
        assert!(helpers[0].is_salaried());
        assert!(!helpers[1].is_salaried());
        assert!(maid.id.starts_with("h_"));
        assert_ne!(maid.id, milkman.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_helper_validation() -> Result<()> {
        let (db, profile) = setup_profile().await?;

        let blank = NewHelper {
            name: "   ".to_string(),
            role: HelperRole::Maid,
            monthly_salary: 100.0,
            default_price_per_liter: 0.0,
            payment_type: PaymentType::Monthly,
            start_date: None,
        };
        let result = create_helper(&db, &profile, blank.clone()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let negative = NewHelper {
            name: "Asha".to_string(),
            monthly_salary: -5.0,
            ..blank.clone()
        };
        let result = create_helper(&db, &profile, negative).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let nan_price = NewHelper {
            name: "Asha".to_string(),
            default_price_per_liter: f64::NAN,
            ..blank
        };
        let result = create_helper(&db, &profile, nan_price).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        assert!(list_helpers(&db, &profile).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_helper_trims_name_and_sets_start_date() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let helper = create_helper(
            &db,
            &profile,
            NewHelper {
                name: "  Kamla  ".to_string(),
                role: HelperRole::Other,
                monthly_salary: 1500.0,
                default_price_per_liter: 0.0,
                payment_type: PaymentType::Daily,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            },
        )
        .await?;

        assert_eq!(helper.name, "Kamla");
        assert_eq!(helper.start_date, "2024-01-15");
        Ok(())
    }

    #[tokio::test]
    async fn test_find_helper_by_name_is_case_insensitive() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let maid = create_test_maid(&db, &profile, "Sunita", 3000.0).await?;

        let found = find_helper_by_name(&db, &profile, " sunita ").await?.unwrap();
        assert_eq!(found.id, maid.id);
        assert!(find_helper_by_name(&db, &profile, "Geeta").await?.is_none());
        assert_eq!(find_helper(&db, &profile, &maid.id).await?.unwrap().name, "Sunita");
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let mut maid = create_test_maid(&db, &profile, "Sunita", 3000.0).await?;

        maid.monthly_salary = 3500.0;
        upsert_helper(&db, &profile, maid.clone()).await?;

        let helpers = list_helpers(&db, &profile).await?;
        assert_eq!(helpers.len(), 1);
        assert_eq!(helpers[0].monthly_salary, 3500.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_helper() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let maid = create_test_maid(&db, &profile, "Sunita", 3000.0).await?;

        let updated = update_helper(
            &db,
            &profile,
            &maid.id,
            HelperUpdate {
                monthly_salary: Some(3200.0),
                payment_type: Some(PaymentType::Daily),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.monthly_salary, 3200.0);
        assert_eq!(updated.payment_type, PaymentType::Daily);
        assert_eq!(updated.name, "Sunita");

        let missing = update_helper(&db, &profile, "h_missing", HelperUpdate::default()).await;
        assert!(matches!(missing, Err(Error::HelperNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_helper() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let maid = create_test_maid(&db, &profile, "Sunita", 3000.0).await?;

        assert!(delete_helper(&db, &profile, &maid.id).await?);
        assert!(!delete_helper(&db, &profile, &maid.id).await?);
        assert!(list_helpers(&db, &profile).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_quick_add_milkman() -> Result<()> {
        let (db, profile) = setup_profile().await?;

        assert!(quick_add_milkman(&db, &profile, "  ").await?.is_none());
        let milkman = quick_add_milkman(&db, &profile, "Gopal").await?.unwrap();
        assert_eq!(milkman.role, HelperRole::Milkman);
        assert_eq!(milkman.monthly_salary, 0.0);
        assert_eq!(milkman.payment_type, PaymentType::Monthly);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_helpers_only_when_empty() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let settings = Settings {
            default_profile: "default".to_string(),
            helpers: vec![HelperSeed {
                name: "Sunita".to_string(),
                role: HelperRole::Maid,
                monthly_salary: 3000.0,
                default_price_per_liter: 0.0,
                payment_type: PaymentType::Monthly,
            }],
        };

        assert_eq!(seed_helpers(&db, &profile, &settings).await?, 1);
        assert_eq!(seed_helpers(&db, &profile, &settings).await?, 0);
        assert_eq!(list_helpers(&db, &profile).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_lenient_decoding_of_stored_helpers() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let raw = json!([
            {"id": "h_1", "name": "Sunita", "role": "Maid", "monthlySalary": "3000", "paymentType": "Monthly"},
            {"id": "h_2", "name": "Lakshmi", "role": "Cook", "monthlySalary": "lots", "paymentType": "Weekly"},
            {"id": "h_3", "name": "Geeta", "role": "Maid", "monthlySalary": 200},
            {"id": "h_4", "name": "Meena", "role": "Maid", "monthlySalary": 200, "paymentType": null},
            {"name": "No id"}
        ]);
        store::save(&db, &profile, HELPERS_KEY, &raw).await?;

        let helpers = list_helpers(&db, &profile).await?;
        assert_eq!(helpers.len(), 4);
        assert_eq!(helpers[0].monthly_salary, 3000.0);
        assert_eq!(helpers[0].payment_type, PaymentType::Monthly);
        assert_eq!(helpers[1].role, HelperRole::Other);
        assert_eq!(helpers[1].monthly_salary, 0.0);
        assert_eq!(helpers[1].payment_type, PaymentType::Daily);
        assert_eq!(helpers[2].payment_type, PaymentType::Daily);
        assert_eq!(helpers[3].payment_type, PaymentType::Daily);
        Ok(())
    }
}
