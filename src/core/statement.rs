//! Monthly statement - the aggregation of all four ledgers for one month.
//!
//! [`compute_monthly_statement`] is a pure function of a [`LedgerSnapshot`] and a
//! month. Every consumer (statement, export, dashboard, maid summary) goes
//! through it. [`load_monthly_statement`] re-reads the ledgers on each call.

use crate::{
    core::{
        attendance::{self, AttendanceMark, AttendanceStatus},
        helper::{self, Helper, HelperRole, PaymentType},
        milk::{self, MilkEntry},
        month::MonthKey,
        payment::{self, Payment, PaymentKind},
    },
    errors::Result,
    store::ProfileId,
};
use sea_orm::ConnectionTrait;
use std::collections::{HashMap, HashSet};

/// Outstanding amounts at or below this count as settled.
pub const SETTLED_TOLERANCE: f64 = 1.0;

/// Label used for helper ids that no longer exist in the registry
pub const UNKNOWN_HELPER: &str = "Unknown";

/// Everything the statement is computed from
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Helper registry, in stored order
    pub helpers: Vec<Helper>,
    /// Every recorded attendance mark
    pub attendance: Vec<AttendanceMark>,
    /// Every milk entry
    pub milk: Vec<MilkEntry>,
    /// Every payment
    pub payments: Vec<Payment>,
}

impl LedgerSnapshot {
    /// Reads all four ledgers of a profile.
    pub async fn load<C>(db: &C, profile: &ProfileId) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        Ok(Self {
            helpers: helper::list_helpers(db, profile).await?,
            attendance: attendance::list_attendance_marks(db, profile).await?,
            milk: milk::list_milk_entries(db, profile).await?,
            payments: payment::list_payments(db, profile).await?,
        })
    }
}

/// Whether a line is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStatus {
    /// Outstanding within the tolerance
    Paid,
    /// Money still owed
    Due,
}

impl SettlementStatus {
    /// Classifies an outstanding amount
    #[must_use]
    pub fn from_outstanding(outstanding: f64) -> Self {
        if outstanding <= SETTLED_TOLERANCE {
            Self::Paid
        } else {
            Self::Due
        }
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Paid => "Paid",
            Self::Due => "Due",
        })
    }
}

/// Salary figures for one helper in the month
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryLine {
    /// Helper id as referenced by the ledgers
    pub helper_id: String,
    /// Registry name, `None` when the helper was deleted
    pub helper_name: Option<String>,
    /// Registry role, `None` when the helper was deleted
    pub role: Option<HelperRole>,
    /// Registry payment type, `None` when the helper was deleted
    pub payment_type: Option<PaymentType>,
    /// Days marked Present
    pub present_days: u32,
    /// Days marked Present or Absent
    pub recorded_days: u32,
    /// Salary earned this month
    pub calculated_salary: f64,
    /// Sum of salary payments attributed to this month
    pub paid_salary: f64,
    /// `max(0, calculated - paid)`
    pub outstanding_salary: f64,
}

impl SalaryLine {
    /// Display name, "Unknown" for deleted helpers
    #[must_use]
    pub fn label(&self) -> &str {
        self.helper_name.as_deref().unwrap_or(UNKNOWN_HELPER)
    }

    /// Paid or Due
    #[must_use]
    pub fn status(&self) -> SettlementStatus {
        SettlementStatus::from_outstanding(self.outstanding_salary)
    }
}

/// Key of a milk bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MilkBucketKey {
    /// Entries without a milkman
    Unassigned,
    /// Entries of one milkman (who may since have been deleted)
    Helper(String),
}

impl MilkBucketKey {
    /// Bucket for an entry's helper id
    #[must_use]
    pub fn from_helper_id(helper_id: Option<&str>) -> Self {
        helper_id.map_or(Self::Unassigned, |id| Self::Helper(id.to_string()))
    }

    /// Helper id recorded on milk payments made against this bucket
    #[must_use]
    pub fn helper_id(&self) -> Option<&str> {
        match self {
            Self::Unassigned => None,
            Self::Helper(id) => Some(id),
        }
    }
}

/// Milk bill for one bucket in the month
#[derive(Debug, Clone, PartialEq)]
pub struct MilkBucket {
    /// Milkman or unassigned
    pub key: MilkBucketKey,
    /// Registry name of the milkman, if known
    pub helper_name: Option<String>,
    /// Total liters
    pub liters: f64,
    /// Sum of per-entry `liters * price`
    pub cost: f64,
    /// Milk payments carrying this bucket's helper id; every milk payment of
    /// the month for the unassigned bucket
    pub paid: f64,
    /// `max(0, cost - paid)`
    pub outstanding: f64,
}

impl MilkBucket {
    /// Display name of the bucket
    #[must_use]
    pub fn label(&self) -> &str {
        match (&self.key, &self.helper_name) {
            (MilkBucketKey::Unassigned, _) => "Unassigned / General",
            (MilkBucketKey::Helper(_), Some(name)) => name,
            (MilkBucketKey::Helper(_), None) => UNKNOWN_HELPER,
        }
    }

    /// Paid or Due
    #[must_use]
    pub fn status(&self) -> SettlementStatus {
        SettlementStatus::from_outstanding(self.outstanding)
    }
}

/// Month-wide milk figures.
///
/// `paid` counts every milk payment of the month regardless of helper, so
/// `outstanding` may differ from the sum of the buckets' outstanding amounts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MilkTotals {
    /// Total liters
    pub liters: f64,
    /// Total cost
    pub cost: f64,
    /// All milk payments of the month
    pub paid: f64,
    /// `max(0, cost - paid)`
    pub outstanding: f64,
}

/// Aggregated figures for one month
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The month aggregated
    pub month: MonthKey,
    /// Salaried helpers in registry order, then unknown helper ids
    pub per_helper_salary: Vec<SalaryLine>,
    /// Milk buckets in order of first entry
    pub milk_by_bucket: Vec<MilkBucket>,
    /// Month-wide milk totals
    pub milk_totals: MilkTotals,
    /// Payments attributed to the month, newest first
    pub payments_in_month: Vec<Payment>,
}

/// Aggregate salary figures over helpers with the Maid role
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaidSummary {
    /// Number of maids
    pub count: usize,
    /// Present days across all maids
    pub present_days: u32,
    /// Recorded days across all maids
    pub recorded_days: u32,
    /// Salary earned
    pub calculated: f64,
    /// Salary paid
    pub paid: f64,
    /// `max(0, calculated - paid)`
    pub outstanding: f64,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardSummary {
    /// Helpers in the registry
    pub active_helpers: usize,
    /// Milk delivered this month
    pub milk_liters: f64,
    /// Milk cost this month
    pub milk_cost: f64,
    /// Salary still owed this month
    pub salary_outstanding: f64,
}

// Folds from +0.0; `Iterator::sum` over nothing yields -0.0
fn total(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, |acc, value| acc + value)
}

fn outstanding(owed: f64, paid: f64) -> f64 {
    if owed > paid { owed - paid } else { 0.0 }
}

fn paid_for(payments: &[Payment], kind: PaymentKind, helper_id: Option<&str>, month: &MonthKey) -> f64 {
    total(
        payments
            .iter()
            .filter(|p| p.targets(kind, helper_id, month))
            .map(|p| p.amount),
    )
}

fn milk_paid_in_month(payments: &[Payment], month: &MonthKey) -> f64 {
    total(
        payments
            .iter()
            .filter(|p| p.kind == PaymentKind::Milk && p.month == month.as_str())
            .map(|p| p.amount),
    )
}

fn calculate_salary(helper: &Helper, present: u32, recorded: u32) -> f64 {
    match helper.payment_type {
        PaymentType::Monthly if recorded > 0 => {
            helper.monthly_salary * f64::from(present) / f64::from(recorded)
        }
        PaymentType::Monthly => 0.0,
        PaymentType::Daily => helper.monthly_salary * f64::from(present),
    }
}

/// Computes the statement for `month` from a snapshot of the ledgers.
#[must_use]
pub fn compute_monthly_statement(month: &MonthKey, ledgers: &LedgerSnapshot) -> Statement {
    // (present, recorded) per helper id
    let mut days: HashMap<&str, (u32, u32)> = HashMap::new();
    let mut seen_ids: Vec<&str> = Vec::new();
    for mark in ledgers.attendance.iter().filter(|m| month.contains(&m.date)) {
        if !mark.status.is_recorded() {
            continue;
        }
        let entry = days.entry(mark.helper_id.as_str()).or_insert_with(|| {
            seen_ids.push(mark.helper_id.as_str());
            (0, 0)
        });
        entry.1 += 1;
        if mark.status == AttendanceStatus::Present {
            entry.0 += 1;
        }
    }

    let mut per_helper_salary: Vec<SalaryLine> = ledgers
        .helpers
        .iter()
        .filter(|h| h.is_salaried())
        .map(|h| {
            let (present, recorded) = days.get(h.id.as_str()).copied().unwrap_or((0, 0));
            let calculated = calculate_salary(h, present, recorded);
            let paid = paid_for(&ledgers.payments, PaymentKind::Salary, Some(&h.id), month);
            SalaryLine {
                helper_id: h.id.clone(),
                helper_name: Some(h.name.clone()),
                role: Some(h.role),
                payment_type: Some(h.payment_type),
                present_days: present,
                recorded_days: recorded,
                calculated_salary: calculated,
                paid_salary: paid,
                outstanding_salary: outstanding(calculated, paid),
            }
        })
        .collect();

    // Unregistered helper ids paid a salary this month; attendance alone
    // (e.g. a deleted milkman's old marks) does not make a line
    let registered: HashSet<&str> = ledgers.helpers.iter().map(|h| h.id.as_str()).collect();
    let salary_payers: Vec<&str> = ledgers
        .payments
        .iter()
        .filter(|p| p.kind == PaymentKind::Salary && p.month == month.as_str())
        .filter_map(|p| p.helper_id.as_deref())
        .collect();
    let mut orphans: Vec<&str> = Vec::new();
    for id in seen_ids.iter().copied().chain(salary_payers.iter().copied()) {
        if !registered.contains(id) && salary_payers.contains(&id) && !orphans.contains(&id) {
            orphans.push(id);
        }
    }
    for id in orphans {
        let (present, recorded) = days.get(id).copied().unwrap_or((0, 0));
        let paid = paid_for(&ledgers.payments, PaymentKind::Salary, Some(id), month);
        per_helper_salary.push(SalaryLine {
            helper_id: id.to_string(),
            helper_name: None,
            role: None,
            payment_type: None,
            present_days: present,
            recorded_days: recorded,
            calculated_salary: 0.0,
            paid_salary: paid,
            outstanding_salary: 0.0,
        });
    }

    let names: HashMap<&str, &str> = ledgers
        .helpers
        .iter()
        .map(|h| (h.id.as_str(), h.name.as_str()))
        .collect();

    let mut milk_by_bucket: Vec<MilkBucket> = Vec::new();
    for entry in ledgers.milk.iter().filter(|e| month.contains(&e.date)) {
        let key = MilkBucketKey::from_helper_id(entry.helper_id.as_deref());
        let index = match milk_by_bucket.iter().position(|b| b.key == key) {
            Some(index) => index,
            None => {
                let helper_name = key
                    .helper_id()
                    .and_then(|id| names.get(id))
                    .map(|name| (*name).to_string());
                milk_by_bucket.push(MilkBucket {
                    key,
                    helper_name,
                    liters: 0.0,
                    cost: 0.0,
                    paid: 0.0,
                    outstanding: 0.0,
                });
                milk_by_bucket.len() - 1
            }
        };
        let bucket = &mut milk_by_bucket[index];
        bucket.liters += entry.liters;
        bucket.cost += entry.cost();
    }
    let paid = milk_paid_in_month(&ledgers.payments, month);
    for bucket in &mut milk_by_bucket {
        bucket.paid = match &bucket.key {
            MilkBucketKey::Unassigned => paid,
            MilkBucketKey::Helper(id) => {
                paid_for(&ledgers.payments, PaymentKind::Milk, Some(id), month)
            }
        };
        bucket.outstanding = outstanding(bucket.cost, bucket.paid);
    }

    let liters = total(milk_by_bucket.iter().map(|b| b.liters));
    let cost = total(milk_by_bucket.iter().map(|b| b.cost));
    let milk_totals = MilkTotals {
        liters,
        cost,
        paid,
        outstanding: outstanding(cost, paid),
    };

    Statement {
        month: month.clone(),
        per_helper_salary,
        milk_by_bucket,
        milk_totals,
        payments_in_month: payments_in_month(month, &ledgers.payments),
    }
}

/// Payments attributed to `month`, newest first. Ties keep stored order.
#[must_use]
pub fn payments_in_month(month: &MonthKey, payments: &[Payment]) -> Vec<Payment> {
    let mut items: Vec<Payment> = payments
        .iter()
        .filter(|p| p.month == month.as_str())
        .cloned()
        .collect();
    items.sort_by(|a, b| b.date.cmp(&a.date));
    items
}

/// Liters delivered on each calendar day of the month, index 0 being the 1st.
#[must_use]
pub fn daily_milk_liters(month: &MonthKey, entries: &[MilkEntry]) -> Vec<f64> {
    let days = usize::try_from(month.days_in_month()).unwrap_or(0);
    let mut totals = vec![0.0; days];

    for entry in entries.iter().filter(|e| month.contains(&e.date)) {
        let day = entry
            .date
            .rsplit('-')
            .next()
            .and_then(|d| d.parse::<usize>().ok());
        if let Some(day) = day.filter(|d| (1..=days).contains(d)) {
            totals[day - 1] += entry.liters;
        }
    }

    totals
}

impl Statement {
    /// Totals across helpers with the Maid role, `None` when there are none
    #[must_use]
    pub fn maid_summary(&self) -> Option<MaidSummary> {
        let maids: Vec<&SalaryLine> = self
            .per_helper_salary
            .iter()
            .filter(|line| line.role == Some(HelperRole::Maid))
            .collect();
        if maids.is_empty() {
            return None;
        }

        let mut summary = MaidSummary {
            count: maids.len(),
            ..Default::default()
        };
        for line in maids {
            summary.present_days += line.present_days;
            summary.recorded_days += line.recorded_days;
            summary.calculated += line.calculated_salary;
            summary.paid += line.paid_salary;
        }
        summary.outstanding = outstanding(summary.calculated, summary.paid);
        Some(summary)
    }

    /// Dashboard headline numbers; `active_helpers` comes from the registry
    #[must_use]
    pub fn dashboard(&self, active_helpers: usize) -> DashboardSummary {
        DashboardSummary {
            active_helpers,
            milk_liters: self.milk_totals.liters,
            milk_cost: self.milk_totals.cost,
            salary_outstanding: total(
                self.per_helper_salary
                    .iter()
                    .map(|line| line.outstanding_salary),
            ),
        }
    }

    /// Looks up the salary line of a helper
    #[must_use]
    pub fn salary_line(&self, helper_id: &str) -> Option<&SalaryLine> {
        self.per_helper_salary.iter().find(|line| line.helper_id == helper_id)
    }

    /// Looks up a milk bucket
    #[must_use]
    pub fn milk_bucket(&self, key: &MilkBucketKey) -> Option<&MilkBucket> {
        self.milk_by_bucket.iter().find(|bucket| &bucket.key == key)
    }
}

/// Loads current ledger state and computes the statement for `month`.
pub async fn load_monthly_statement<C>(
    db: &C,
    profile: &ProfileId,
    month: &MonthKey,
) -> Result<Statement>
where
    C: ConnectionTrait,
{
    let snapshot = LedgerSnapshot::load(db, profile).await?;
    let statement = compute_monthly_statement(month, &snapshot);
    tracing::debug!(
        profile = %profile,
        month = %month,
        salary_lines = statement.per_helper_salary.len(),
        milk_buckets = statement.milk_by_bucket.len(),
        "Computed monthly statement"
    );
    Ok(statement)
}
