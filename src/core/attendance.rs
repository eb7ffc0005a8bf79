//! Attendance ledger - per-date, per-helper presence marks.
//!
//! Stored under the `attendance` key as `{ "YYYY-MM-DD": { helperId: "P" | "A" } }`.
//! A pair that was never marked is `Unset`, which is different from `Absent`:
//! unset days are left out of the recorded-day count entirely.

use crate::{
    core::month,
    errors::{Error, Result},
    store::{self, ProfileId},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt};

/// Store key holding the attendance sheet
pub const ATTENDANCE_KEY: &str = "attendance";

/// Presence of a helper on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    /// Worked that day
    Present,
    /// Did not work that day
    Absent,
    /// Nothing recorded
    Unset,
}

impl AttendanceStatus {
    /// Decodes the stored code; anything other than `P` or `A` is `Unset`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "P" => Self::Present,
            "A" => Self::Absent,
            _ => Self::Unset,
        }
    }

    /// The stored code, `None` for `Unset`
    #[must_use]
    pub const fn code(self) -> Option<&'static str> {
        match self {
            Self::Present => Some("P"),
            Self::Absent => Some("A"),
            Self::Unset => None,
        }
    }

    /// Next state of the attendance toggle: Unset -> Present -> Absent -> Unset
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Unset => Self::Present,
            Self::Present => Self::Absent,
            Self::Absent => Self::Unset,
        }
    }

    /// Whether this mark counts as a recorded day
    #[must_use]
    pub const fn is_recorded(self) -> bool {
        matches!(self, Self::Present | Self::Absent)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Unset => "Not marked",
        })
    }
}

/// One recorded presence mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceMark {
    /// `YYYY-MM-DD` as stored
    pub date: String,
    /// Helper the mark belongs to (may no longer exist in the registry)
    pub helper_id: String,
    /// Present or Absent
    pub status: AttendanceStatus,
}

type Sheet = BTreeMap<String, BTreeMap<String, AttendanceStatus>>;

fn decode_sheet(raw: Option<Value>) -> Sheet {
    let mut sheet = Sheet::new();
    let Some(Value::Object(dates)) = raw else {
        return sheet;
    };

    for (date, helpers) in dates {
        let Value::Object(helpers) = helpers else {
            tracing::warn!(date = %date, "Skipping malformed attendance day");
            continue;
        };
        if date.trim().is_empty() {
            continue;
        }

        let day: BTreeMap<String, AttendanceStatus> = helpers
            .into_iter()
            .filter_map(|(helper_id, status)| {
                let status = status.as_str().map_or(AttendanceStatus::Unset, AttendanceStatus::from_code);
                status.is_recorded().then_some((helper_id, status))
            })
            .collect();

        if !day.is_empty() {
            sheet.insert(date, day);
        }
    }

    sheet
}

fn encode_sheet(sheet: &Sheet) -> Value {
    let dates: Map<String, Value> = sheet
        .iter()
        .map(|(date, helpers)| {
            let day: Map<String, Value> = helpers
                .iter()
                .filter_map(|(helper_id, status)| {
                    status
                        .code()
                        .map(|code| (helper_id.clone(), Value::String(code.to_string())))
                })
                .collect();
            (date.clone(), Value::Object(day))
        })
        .collect();
    Value::Object(dates)
}

async fn load_sheet<C>(db: &C, profile: &ProfileId) -> Result<Sheet>
where
    C: ConnectionTrait,
{
    let raw = store::load_raw(db, profile, ATTENDANCE_KEY).await?;
    Ok(decode_sheet(raw))
}

/// Lists every recorded mark, ordered by date then helper id.
pub async fn list_attendance_marks<C>(db: &C, profile: &ProfileId) -> Result<Vec<AttendanceMark>>
where
    C: ConnectionTrait,
{
    let sheet = load_sheet(db, profile).await?;
    Ok(sheet
        .into_iter()
        .flat_map(|(date, helpers)| {
            helpers.into_iter().map(move |(helper_id, status)| AttendanceMark {
                date: date.clone(),
                helper_id,
                status,
            })
        })
        .collect())
}

/// Returns the marks recorded on one date, keyed by helper id.
pub async fn attendance_for_date<C>(
    db: &C,
    profile: &ProfileId,
    date: NaiveDate,
) -> Result<BTreeMap<String, AttendanceStatus>>
where
    C: ConnectionTrait,
{
    let mut sheet = load_sheet(db, profile).await?;
    Ok(sheet.remove(&month::format_date(date)).unwrap_or_default())
}

/// Records a mark. `Unset` clears any existing mark for that day.
pub async fn set_attendance(
    db: &DatabaseConnection,
    profile: &ProfileId,
    date: NaiveDate,
    helper_id: &str,
    status: AttendanceStatus,
) -> Result<()> {
    if helper_id.trim().is_empty() {
        return Err(Error::Validation {
            message: "Helper id cannot be empty".to_string(),
        });
    }

    let date_key = month::format_date(date);
    let txn = db.begin().await?;
    let mut sheet = load_sheet(&txn, profile).await?;

    if status.is_recorded() {
        sheet
            .entry(date_key.clone())
            .or_default()
            .insert(helper_id.to_string(), status);
    } else if let Some(day) = sheet.get_mut(&date_key) {
        day.remove(helper_id);
        if day.is_empty() {
            sheet.remove(&date_key);
        }
    }

    store::save(&txn, profile, ATTENDANCE_KEY, &encode_sheet(&sheet)).await?;
    txn.commit().await?;

    tracing::debug!(profile = %profile, date = %date_key, helper_id, "Attendance set to {status}");
    Ok(())
}

/// Advances a helper's mark for the day through the toggle cycle and returns
/// the new status.
pub async fn toggle_attendance(
    db: &DatabaseConnection,
    profile: &ProfileId,
    date: NaiveDate,
    helper_id: &str,
) -> Result<AttendanceStatus> {
    let current = attendance_for_date(db, profile, date)
        .await?
        .get(helper_id)
        .copied()
        .unwrap_or(AttendanceStatus::Unset);
    let next = current.cycle();
    set_attendance(db, profile, date, helper_id, next).await?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_status_cycle() {
        assert_eq!(AttendanceStatus::Unset.cycle(), AttendanceStatus::Present);
        assert_eq!(AttendanceStatus::Present.cycle(), AttendanceStatus::Absent);
        assert_eq!(AttendanceStatus::Absent.cycle(), AttendanceStatus::Unset);
        assert_eq!(AttendanceStatus::from_code("X"), AttendanceStatus::Unset);
    }

    #[tokio::test]
    async fn test_set_and_read_attendance() -> Result<()> {
        let (db, profile) = setup_profile().await?;

        set_attendance(&db, &profile, day(2), "h_b", AttendanceStatus::Absent).await?;
        set_attendance(&db, &profile, day(1), "h_a", AttendanceStatus::Present).await?;
        set_attendance(&db, &profile, day(1), "h_b", AttendanceStatus::Present).await?;

        let marks = list_attendance_marks(&db, &profile).await?;
        assert_eq!(marks.len(), 3);
        assert_eq!(marks[0].date, "2024-05-01");
        assert_eq!(marks[0].helper_id, "h_a");
        assert_eq!(marks[1].helper_id, "h_b");
        assert_eq!(marks[2].date, "2024-05-02");
        assert_eq!(marks[2].status, AttendanceStatus::Absent);

        let first = attendance_for_date(&db, &profile, day(1)).await?;
        assert_eq!(first.len(), 2);
        assert!(attendance_for_date(&db, &profile, day(9)).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unset_clears_mark() -> Result<()> {
        let (db, profile) = setup_profile().await?;

        set_attendance(&db, &profile, day(1), "h_a", AttendanceStatus::Present).await?;
        set_attendance(&db, &profile, day(1), "h_a", AttendanceStatus::Unset).await?;

        assert!(list_attendance_marks(&db, &profile).await?.is_empty());
        let raw = store::load_raw(&db, &profile, ATTENDANCE_KEY).await?.unwrap();
        assert_eq!(raw, json!({}));
        Ok(())
    }

    #[tokio::test]
    async fn test_overwrite_mark() -> Result<()> {
        let (db, profile) = setup_profile().await?;

        set_attendance(&db, &profile, day(1), "h_a", AttendanceStatus::Present).await?;
        set_attendance(&db, &profile, day(1), "h_a", AttendanceStatus::Absent).await?;

        let marks = list_attendance_marks(&db, &profile).await?;
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].status, AttendanceStatus::Absent);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_attendance_cycles() -> Result<()> {
        let (db, profile) = setup_profile().await?;

        assert_eq!(toggle_attendance(&db, &profile, day(3), "h_a").await?, AttendanceStatus::Present);
        assert_eq!(toggle_attendance(&db, &profile, day(3), "h_a").await?, AttendanceStatus::Absent);
        assert_eq!(toggle_attendance(&db, &profile, day(3), "h_a").await?, AttendanceStatus::Unset);
        assert!(list_attendance_marks(&db, &profile).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_stored_format_and_lenient_load() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        set_attendance(&db, &profile, day(1), "h_a", AttendanceStatus::Present).await?;

        let raw = store::load_raw(&db, &profile, ATTENDANCE_KEY).await?.unwrap();
        assert_eq!(raw, json!({"2024-05-01": {"h_a": "P"}}));

        let messy = json!({
            "2024-05-01": {"h_a": "P", "h_b": "", "h_c": 3},
            "2024-05-02": "garbage"
        });
        store::save(&db, &profile, ATTENDANCE_KEY, &messy).await?;
        let marks = list_attendance_marks(&db, &profile).await?;
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].helper_id, "h_a");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_helper_id_rejected() -> Result<()> {
        let (db, profile) = setup_profile().await?;
        let result = set_attendance(&db, &profile, day(1), " ", AttendanceStatus::Present).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
