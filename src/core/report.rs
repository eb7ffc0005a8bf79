//! Plain-text rendering of statements and dashboard figures.
//!
//! The monthly statement has three sections: Salary Overview, Milk Bill and
//! Payment History. Bot replies and the exported statement file both come from
//! these renderers.

use crate::{
    core::{
        helper::Helper,
        payment::{Payment, PaymentKind},
        statement::{DashboardSummary, MaidSummary, Statement, UNKNOWN_HELPER},
    },
    errors::Result,
};
use std::{collections::HashMap, fmt::Write};

/// Formats an amount as rupees with Indian digit grouping.
///
/// At most two decimals are shown and trailing zeros are dropped, so `2700.0`
/// renders as `₹2,700` and `123456.5` as `₹1,23,456.5`. Non-finite values
/// render as `₹0`.
#[must_use]
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return "₹0".to_string();
    }

    let rounded = format!("{:.2}", value.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };

    let grouped = group_indian(whole);
    if fraction.is_empty() {
        format!("{sign}₹{grouped}")
    } else {
        format!("{sign}₹{grouped}.{fraction}")
    }
}

/// Groups digits as lakhs and crores: last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (mut rest, last_three) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    while rest.len() > 2 {
        let (head, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = head;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    format!("{},{last_three}", groups.join(","))
}

/// Formats liters with one decimal, e.g. `12.5 L`
#[must_use]
pub fn format_liters(liters: f64) -> String {
    // Adding +0.0 turns -0.0 into 0.0
    format!("{:.1} L", liters + 0.0)
}

/// Text bar such as `████░░░░░░` for `value` relative to `max`.
#[must_use]
pub fn format_bar(value: f64, max: f64, bar_length: usize) -> String {
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = (ratio * bar_length as f64).round() as usize;
    let empty = bar_length.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// "To / For" column of the payment history
#[must_use]
pub fn payee_label<'a>(payment: &Payment, names: &HashMap<&str, &'a str>) -> &'a str {
    match payment.kind {
        PaymentKind::Milk => "Milk bill",
        _ => payment
            .helper_id
            .as_deref()
            .and_then(|id| names.get(id).copied())
            .unwrap_or(UNKNOWN_HELPER),
    }
}

/// One line describing a payment
#[must_use]
pub fn format_payment_line(payment: &Payment, payee: &str) -> String {
    format!(
        "{} | {} | {} | {} | {}",
        payment.date,
        payment.kind,
        payee,
        payment.month,
        format_money(payment.amount)
    )
}

/// The maids summary sentence shown under the salary table.
#[must_use]
pub fn format_maid_summary(summary: &MaidSummary) -> String {
    let recorded = if summary.recorded_days == 0 {
        "-".to_string()
    } else {
        summary.recorded_days.to_string()
    };

    format!(
        "Maids: {}/{} present-days across {} maid(s). Salary: {}, Paid: {}, Outstanding: {}.",
        summary.present_days,
        recorded,
        summary.count,
        format_money(summary.calculated),
        format_money(summary.paid),
        format_money(summary.outstanding)
    )
}

/// Renders the full monthly statement.
///
/// `helpers` is the current registry, used to name payees in the payment
/// history.
pub fn render_statement(statement: &Statement, helpers: &[Helper]) -> Result<String> {
    let names: HashMap<&str, &str> = helpers
        .iter()
        .map(|h| (h.id.as_str(), h.name.as_str()))
        .collect();

    let mut out = String::new();
    writeln!(out, "GharKhata Monthly Statement")?;
    writeln!(out, "Month: {} ({})", statement.month, statement.month.label())?;

    writeln!(out, "\nSalary Overview")?;
    if statement.per_helper_salary.is_empty() {
        writeln!(out, "  No helpers for this month.")?;
    }
    for line in &statement.per_helper_salary {
        let role = line.role.map_or_else(|| "-".to_string(), |r| r.to_string());
        writeln!(
            out,
            "  {} ({role}) | {}/{} days | Salary {} | Paid {} | Outstanding {} | {}",
            line.label(),
            line.present_days,
            line.recorded_days,
            format_money(line.calculated_salary),
            format_money(line.paid_salary),
            format_money(line.outstanding_salary),
            line.status()
        )?;
    }
    if let Some(maids) = statement.maid_summary() {
        writeln!(out, "  {}", format_maid_summary(&maids))?;
    }

    writeln!(out, "\nMilk Bill")?;
    let totals = &statement.milk_totals;
    writeln!(
        out,
        "  Total: {} | {} | Paid {} | Outstanding {}",
        format_liters(totals.liters),
        format_money(totals.cost),
        format_money(totals.paid),
        format_money(totals.outstanding)
    )?;
    if statement.milk_by_bucket.is_empty() {
        writeln!(out, "  No milk entries for this month.")?;
    }
    for bucket in &statement.milk_by_bucket {
        writeln!(
            out,
            "  {} | {} | {} | Paid {} | Outstanding {} | {}",
            bucket.label(),
            format_liters(bucket.liters),
            format_money(bucket.cost),
            format_money(bucket.paid),
            format_money(bucket.outstanding),
            bucket.status()
        )?;
    }

    writeln!(out, "\nPayment History")?;
    if statement.payments_in_month.is_empty() {
        writeln!(out, "  No payments recorded for this month.")?;
    }
    for payment in &statement.payments_in_month {
        writeln!(out, "  {}", format_payment_line(payment, payee_label(payment, &names)))?;
    }

    Ok(out)
}

/// Renders the dashboard headline numbers and a per-day milk chart.
pub fn render_dashboard(summary: &DashboardSummary, daily_liters: &[f64]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Active Helpers: {}", summary.active_helpers)?;
    writeln!(out, "Milk: {}", format_liters(summary.milk_liters))?;
    writeln!(out, "Milk Cost: {}", format_money(summary.milk_cost))?;
    writeln!(out, "Salary Outstanding: {}", format_money(summary.salary_outstanding))?;

    let max = daily_liters.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        writeln!(out, "\nMilk per day")?;
        for (index, liters) in daily_liters.iter().enumerate() {
            if *liters > 0.0 {
                writeln!(out, "{:>2} {} {liters:.1}", index + 1, format_bar(*liters, max, 12))?;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        helper::{HelperRole, PaymentType},
        month::MonthKey,
        statement::{LedgerSnapshot, compute_monthly_statement},
    };

    fn payment(kind: PaymentKind, helper_id: Option<&str>, amount: f64) -> Payment {
        Payment {
            id: "p_1".to_string(),
            date: "2024-05-31".to_string(),
            kind,
            helper_id: helper_id.map(str::to_string),
            month: "2024-05".to_string(),
            amount,
            notes: String::new(),
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(2700.0), "₹2,700");
        assert_eq!(format_money(123_456.5), "₹1,23,456.5");
        assert_eq!(format_money(0.0), "₹0");
        assert_eq!(format_money(999.999), "₹1,000");
        assert_eq!(format_money(12.346), "₹12.35");
        assert_eq!(format_money(10_000_000.0), "₹1,00,00,000");
        assert_eq!(format_money(-1500.25), "-₹1,500.25");
        assert_eq!(format_money(f64::NAN), "₹0");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(5.0, 10.0, 10), "█████░░░░░");
        assert_eq!(format_bar(0.0, 0.0, 4), "░░░░");
        assert_eq!(format_bar(20.0, 10.0, 4), "████");
    }

    #[test]
    fn test_payee_label() {
        let names: HashMap<&str, &str> = [("h_a", "Sunita")].into_iter().collect();
        assert_eq!(payee_label(&payment(PaymentKind::Milk, Some("h_a"), 1.0), &names), "Milk bill");
        assert_eq!(payee_label(&payment(PaymentKind::Salary, Some("h_a"), 1.0), &names), "Sunita");
        assert_eq!(payee_label(&payment(PaymentKind::Salary, Some("h_x"), 1.0), &names), "Unknown");
    }

    #[test]
    fn test_format_maid_summary() {
        let summary = MaidSummary {
            count: 2,
            present_days: 0,
            recorded_days: 0,
            calculated: 0.0,
            paid: 500.0,
            outstanding: 0.0,
        };
        assert_eq!(
            format_maid_summary(&summary),
            "Maids: 0/- present-days across 2 maid(s). Salary: ₹0, Paid: ₹500, Outstanding: ₹0."
        );
    }

    #[test]
    fn test_render_empty_statement_has_placeholders() {
        let month = MonthKey::parse("2024-05").unwrap();
        let statement = compute_monthly_statement(&month, &LedgerSnapshot::default());

        let text = render_statement(&statement, &[]).unwrap();
        assert!(text.contains("Month: 2024-05 (May 2024)"));
        assert!(text.contains("No helpers for this month."));
        assert!(text.contains("No milk entries for this month."));
        assert!(text.contains("No payments recorded for this month."));
        assert!(text.contains("Total: 0.0 L | ₹0 | Paid ₹0 | Outstanding ₹0"));
        assert!(!text.contains("-0"));

        let dashboard = render_dashboard(&statement.dashboard(0), &[]).unwrap();
        assert!(dashboard.contains("Milk: 0.0 L"));
        assert!(!dashboard.contains("-0"));
    }

    #[test]
    fn test_render_statement_sections() {
        let month = MonthKey::parse("2024-05").unwrap();
        let maid = Helper {
            id: "h_a".to_string(),
            name: "Sunita".to_string(),
            role: HelperRole::Maid,
            monthly_salary: 3000.0,
            default_price_per_liter: 0.0,
            payment_type: PaymentType::Monthly,
            start_date: "2024-01-01".to_string(),
        };
        let snapshot = LedgerSnapshot {
            helpers: vec![maid],
            payments: vec![payment(PaymentKind::Salary, Some("h_a"), 2700.0)],
            ..Default::default()
        };
        let statement = compute_monthly_statement(&month, &snapshot);

        let text = render_statement(&statement, &snapshot.helpers).unwrap();
        let salary = text.find("Salary Overview").unwrap();
        let milk = text.find("Milk Bill").unwrap();
        let history = text.find("Payment History").unwrap();
        assert!(salary < milk && milk < history);
        assert!(text.contains("Sunita (Maid) | 0/0 days | Salary ₹0 | Paid ₹2,700 | Outstanding ₹0 | Paid"));
        assert!(text.contains("2024-05-31 | Salary | Sunita | 2024-05 | ₹2,700"));
        assert!(text.contains("Maids: 0/- present-days across 1 maid(s)."));
    }

    #[test]
    fn test_render_dashboard() {
        let summary = DashboardSummary {
            active_helpers: 3,
            milk_liters: 4.5,
            milk_cost: 225.0,
            salary_outstanding: 0.0,
        };
        let mut daily = vec![0.0; 31];
        daily[2] = 4.5;

        let text = render_dashboard(&summary, &daily).unwrap();
        assert!(text.contains("Active Helpers: 3"));
        assert!(text.contains("Milk: 4.5 L"));
        assert!(text.contains("Milk Cost: ₹225"));
        assert!(text.contains(" 3 ████████████ 4.5"));
    }
}
