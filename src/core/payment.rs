//! Payment ledger - money paid against salaries and milk bills.
//!
//! A payment targets a (kind, helper, month) triple. Several payments may target
//! the same triple; the monthly statement sums them.

use crate::{
    core::{
        lenient,
        month::{self, MonthKey},
    },
    errors::{Error, Result},
    store::{self, ProfileId},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Store key holding the payments
pub const PAYMENTS_KEY: &str = "payments";

/// What a payment settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    /// A helper's salary
    Salary,
    /// A milk bill
    Milk,
    /// Unrecognised type from older data; counted nowhere
    #[serde(other)]
    Other,
}

impl fmt::Display for PaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Salary => "Salary",
            Self::Milk => "Milk",
            Self::Other => "Other",
        })
    }
}

fn lenient_kind<'de, D>(deserializer: D) -> std::result::Result<PaymentKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => match s.as_str() {
            "salary" => PaymentKind::Salary,
            "milk" => PaymentKind::Milk,
            _ => PaymentKind::Other,
        },
        _ => PaymentKind::Other,
    })
}

const fn default_kind() -> PaymentKind {
    PaymentKind::Other
}

/// A recorded payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Opaque id
    #[serde(deserialize_with = "lenient::required_text")]
    pub id: String,
    /// `YYYY-MM-DD` the money changed hands
    #[serde(deserialize_with = "lenient::required_text")]
    pub date: String,
    /// Salary or milk
    #[serde(rename = "type", default = "default_kind", deserialize_with = "lenient_kind")]
    pub kind: PaymentKind,
    /// Helper paid; `None` for general milk purchases
    #[serde(default, deserialize_with = "lenient::optional_id")]
    pub helper_id: Option<String>,
    /// `YYYY-MM` the payment is attributed to
    #[serde(default, deserialize_with = "lenient::text")]
    pub month: String,
    /// Amount paid
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: f64,
    /// Free-form note
    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,
}

impl Payment {
    /// Whether this payment settles `kind` for `helper_id` in `month`
    #[must_use]
    pub fn targets(&self, kind: PaymentKind, helper_id: Option<&str>, month: &MonthKey) -> bool {
        self.kind == kind && self.helper_id.as_deref() == helper_id && self.month == month.as_str()
    }
}

/// Input for [`record_payment`]
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Salary or milk
    pub kind: PaymentKind,
    /// Helper paid, if any
    pub helper_id: Option<String>,
    /// Month the payment settles
    pub month: MonthKey,
    /// Must be finite and positive
    pub amount: f64,
    /// Free-form note
    pub notes: String,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

/// Generates a new opaque payment id
#[must_use]
pub fn generate_payment_id() -> String {
    format!("p_{}", uuid::Uuid::new_v4().simple())
}

/// Lists every payment of a profile in stored order.
pub async fn list_payments<C>(db: &C, profile: &ProfileId) -> Result<Vec<Payment>>
where
    C: ConnectionTrait,
{
    let raw = store::load_raw(db, profile, PAYMENTS_KEY).await?;
    Ok(lenient::decode_records(raw, PAYMENTS_KEY))
}

async fn save_payments<C>(db: &C, profile: &ProfileId, payments: &[Payment]) -> Result<()>
where
    C: ConnectionTrait,
{
    store::save(db, profile, PAYMENTS_KEY, payments).await
}

fn validate_payment(payment: &Payment) -> Result<()> {
    if !payment.amount.is_finite() || payment.amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: payment.amount,
        });
    }
    if payment.id.trim().is_empty() {
        return Err(Error::Validation {
            message: "Payment id cannot be empty".to_string(),
        });
    }
    if payment.kind == PaymentKind::Other {
        return Err(Error::Validation {
            message: "Payment must be for salary or milk".to_string(),
        });
    }
    if payment.kind == PaymentKind::Salary && payment.helper_id.is_none() {
        return Err(Error::Validation {
            message: "Salary payments need a helper".to_string(),
        });
    }
    month::parse_date(&payment.date)?;
    MonthKey::parse(&payment.month)?;
    Ok(())
}

/// Stores a payment, replacing the one with the same id or appending it.
///
/// # Errors
/// [`Error::InvalidAmount`] when the amount is zero, negative, or not finite.
pub async fn upsert_payment(db: &DatabaseConnection, profile: &ProfileId, payment: Payment) -> Result<()> {
    validate_payment(&payment)?;

    let txn = db.begin().await?;
    let mut payments = list_payments(&txn, profile).await?;

    if let Some(existing) = payments.iter_mut().find(|p| p.id == payment.id) {
        *existing = payment;
    } else {
        payments.push(payment);
    }

    save_payments(&txn, profile, &payments).await?;
    txn.commit().await?;
    Ok(())
}

/// Validates and stores a new payment.
///
/// # Errors
/// [`Error::InvalidAmount`] when the amount is zero, negative, or not finite.
pub async fn record_payment(
    db: &DatabaseConnection,
    profile: &ProfileId,
    new_payment: NewPayment,
) -> Result<Payment> {
    let payment = Payment {
        id: generate_payment_id(),
        date: month::format_date(new_payment.date.unwrap_or_else(month::today)),
        kind: new_payment.kind,
        helper_id: new_payment
            .helper_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
        month: new_payment.month.as_str().to_string(),
        amount: new_payment.amount,
        notes: new_payment.notes.trim().to_string(),
    };

    upsert_payment(db, profile, payment.clone()).await?;

    tracing::info!(
        profile = %profile,
        payment_id = %payment.id,
        kind = %payment.kind,
        month = %payment.month,
        "Recorded payment of {}",
        payment.amount
    );
    Ok(payment)
}

/// Deletes a payment. A missing id is a no-op returning `false`.
pub async fn delete_payment(db: &DatabaseConnection, profile: &ProfileId, id: &str) -> Result<bool> {
    let txn = db.begin().await?;
    let mut payments = list_payments(&txn, profile).await?;
    let before = payments.len();
    payments.retain(|p| p.id != id);
    let removed = payments.len() < before;

    if removed {
        save_payments(&txn, profile, &payments).await?;
        tracing::info!(profile = %profile, payment_id = id, "Deleted payment");
    }
    txn.commit().await?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use serde_json::json;

    fn may() -> MonthKey {
        MonthKey::parse("2024-05").unwrap()
    }

    #[tokio::test]
    async fn test_record_payment() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let maid = create_test_maid(&db, &profile, "Sunita", 3000.0).await?;

        let payment = record_payment(
            &db,
            &profile,
            NewPayment {
                kind: PaymentKind::Salary,
                helper_id: Some(maid.id.clone()),
                month: may(),
                amount: 2700.0,
                notes: "  May salary ".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 6, 1),
            },
        )
        .await?;

        assert!(payment.id.starts_with("p_"));
        assert_eq!(payment.date, "2024-06-01");
        assert_eq!(payment.month, "2024-05");
        assert_eq!(payment.notes, "May salary");
        assert!(payment.targets(PaymentKind::Salary, Some(maid.id.as_str()), &may()));
        assert!(!payment.targets(PaymentKind::Milk, Some(maid.id.as_str()), &may()));

        let stored = list_payments(&db, &profile).await?;
        assert_eq!(stored, vec![payment]);
        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_rejects_bad_amounts() -> Result<()> {
        let (db, profile) = setup_profile().await?;

        for amount in [0.0, -50.0, f64::NAN, f64::INFINITY] {
            let result = record_payment(
                &db,
                &profile,
                NewPayment {
                    kind: PaymentKind::Milk,
                    helper_id: None,
                    month: may(),
                    amount,
                    notes: String::new(),
                    date: None,
                },
            )
            .await;
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }

        assert!(list_payments(&db, &profile).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_salary_payment_requires_helper() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let result = record_payment(
            &db,
            &profile,
            NewPayment {
                kind: PaymentKind::Salary,
                helper_id: Some(" ".to_string()),
                month: may(),
                amount: 100.0,
                notes: String::new(),
                date: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_payment() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let payment = add_test_payment(&db, &profile, PaymentKind::Milk, None, "2024-05", 500.0).await?;

        assert!(!delete_payment(&db, &profile, "p_missing").await?);
        assert!(delete_payment(&db, &profile, &payment.id).await?);
        assert!(list_payments(&db, &profile).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_payment_replaces_or_appends() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let mut payment = add_test_payment(&db, &profile, PaymentKind::Milk, None, "2024-05", 500.0).await?;

        payment.amount = 450.0;
        payment.notes = "Corrected".to_string();
        upsert_payment(&db, &profile, payment.clone()).await?;
        assert_eq!(list_payments(&db, &profile).await?, vec![payment.clone()]);

        let imported = Payment {
            id: "p_imported".to_string(),
            date: "2024-05-20".to_string(),
            kind: PaymentKind::Salary,
            helper_id: Some("h_1".to_string()),
            month: "2024-05".to_string(),
            amount: 1200.0,
            notes: String::new(),
        };
        upsert_payment(&db, &profile, imported.clone()).await?;

        let stored = list_payments(&db, &profile).await?;
        assert_eq!(stored, vec![payment, imported]);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_payment_validates() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let valid = Payment {
            id: "p_1".to_string(),
            date: "2024-05-20".to_string(),
            kind: PaymentKind::Milk,
            helper_id: None,
            month: "2024-05".to_string(),
            amount: 100.0,
            notes: String::new(),
        };

        let zero = Payment { amount: 0.0, ..valid.clone() };
        assert!(matches!(upsert_payment(&db, &profile, zero).await, Err(Error::InvalidAmount { .. })));
        let bad_month = Payment { month: "May".to_string(), ..valid.clone() };
        assert!(matches!(upsert_payment(&db, &profile, bad_month).await, Err(Error::InvalidMonth { .. })));
        let bad_date = Payment { date: "20/05/2024".to_string(), ..valid.clone() };
        assert!(matches!(upsert_payment(&db, &profile, bad_date).await, Err(Error::InvalidDate { .. })));
        let unknown_kind = Payment { kind: PaymentKind::Other, ..valid };
        assert!(matches!(upsert_payment(&db, &profile, unknown_kind).await, Err(Error::Validation { .. })));

        assert!(list_payments(&db, &profile).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_stored_format_and_lenient_load() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        add_test_payment(&db, &profile, PaymentKind::Milk, None, "2024-05", 500.0).await?;

        let raw = store::load_raw(&db, &profile, PAYMENTS_KEY).await?.unwrap();
        assert_eq!(raw[0]["type"], json!("milk"));
        assert_eq!(raw[0]["helperId"], json!(null));

        let messy = json!([
            {"id": "p_1", "date": "2024-05-02", "type": "salary", "helperId": "h_1", "month": "2024-05", "amount": "1500"},
            {"id": "p_2", "date": "2024-05-03", "type": "tip", "month": "2024-05", "amount": 20},
            {"id": "p_3", "type": "milk", "amount": 20}
        ]);
        store::save(&db, &profile, PAYMENTS_KEY, &messy).await?;

        let payments = list_payments(&db, &profile).await?;
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].amount, 1500.0);
        assert_eq!(payments[0].kind, PaymentKind::Salary);
        assert_eq!(payments[1].kind, PaymentKind::Other);
        assert!(payments[1].notes.is_empty());
        Ok(())
    }
}
