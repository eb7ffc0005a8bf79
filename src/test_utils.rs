//! Shared test utilities for `GharKhata`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating ledger records with sensible defaults.

use crate::{
    core::{
        helper::{self, Helper, HelperRole, NewHelper, PaymentType},
        milk::{self, MilkEntry, NewMilkEntry},
        month::MonthKey,
        payment::{self, NewPayment, Payment, PaymentKind},
    },
    errors::Result,
    store::ProfileId,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Sets up a fresh database and the default profile.
pub async fn setup_profile() -> Result<(DatabaseConnection, ProfileId)> {
    let db = setup_test_db().await?;
    Ok((db, ProfileId::default()))
}

/// Registers a maid paid monthly.
///
/// # Defaults
/// * `start_date`: 2024-01-01
pub async fn create_test_maid(
    db: &DatabaseConnection,
    profile: &ProfileId,
    name: &str,
    monthly_salary: f64,
) -> Result<Helper> {
    create_custom_helper(db, profile, name, HelperRole::Maid, monthly_salary, 0.0, PaymentType::Monthly).await
}

/// Registers a helper paid per day at `day_rate`.
pub async fn create_test_daily_helper(
    db: &DatabaseConnection,
    profile: &ProfileId,
    name: &str,
    day_rate: f64,
) -> Result<Helper> {
    create_custom_helper(db, profile, name, HelperRole::Other, day_rate, 0.0, PaymentType::Daily).await
}

/// Registers a milkman with a default price per liter.
pub async fn create_test_milkman(
    db: &DatabaseConnection,
    profile: &ProfileId,
    name: &str,
    default_price_per_liter: f64,
) -> Result<Helper> {
    create_custom_helper(
        db,
        profile,
        name,
        HelperRole::Milkman,
        0.0,
        default_price_per_liter,
        PaymentType::Monthly,
    )
    .await
}

/// Registers a helper with custom parameters.
pub async fn create_custom_helper(
    db: &DatabaseConnection,
    profile: &ProfileId,
    name: &str,
    role: HelperRole,
    monthly_salary: f64,
    default_price_per_liter: f64,
    payment_type: PaymentType,
) -> Result<Helper> {
    helper::create_helper(
        db,
        profile,
        NewHelper {
            name: name.to_string(),
            role,
            monthly_salary,
            default_price_per_liter,
            payment_type,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        },
    )
    .await
}

/// Adds a milk entry with an explicit price.
pub async fn add_test_milk(
    db: &DatabaseConnection,
    profile: &ProfileId,
    date: NaiveDate,
    helper_id: Option<&str>,
    liters: f64,
    price_per_liter: f64,
) -> Result<MilkEntry> {
    milk::add_milk_entry(
        db,
        profile,
        NewMilkEntry {
            date,
            helper_id: helper_id.map(str::to_string),
            liters,
            price_per_liter: Some(price_per_liter),
        },
    )
    .await
}

/// Records a payment attributed to `month`, dated on the month's last day.
pub async fn add_test_payment(
    db: &DatabaseConnection,
    profile: &ProfileId,
    kind: PaymentKind,
    helper_id: Option<&str>,
    month: &str,
    amount: f64,
) -> Result<Payment> {
    let month = MonthKey::parse(month)?;
    let date = month
        .first_day()
        .and_then(|first| first.checked_add_days(chrono::Days::new(u64::from(month.days_in_month()) - 1)));

    payment::record_payment(
        db,
        profile,
        NewPayment {
            kind,
            helper_id: helper_id.map(str::to_string),
            month,
            amount,
            notes: "Test payment".to_string(),
            date,
        },
    )
    .await
}
