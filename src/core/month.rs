//! Month and date keys.
//!
//! Dates are stored as `YYYY-MM-DD` strings and months as `YYYY-MM`. Filtering a
//! ledger by month is a plain string-prefix match on the stored date (the month
//! followed by `-`), never a calendar conversion: a malformed stored date such as
//! `2024-013-05` simply does not belong to any month.

use crate::errors::{Error, Result};
use chrono::{Datelike, Local, NaiveDate};
use std::{fmt, str::FromStr};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated `YYYY-MM` month key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    key: String,
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Parses a `YYYY-MM` string.
    ///
    /// # Errors
    /// Returns [`Error::InvalidMonth`] unless the input is four digits, a dash,
    /// and a two-digit month between 01 and 12.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let invalid = || Error::InvalidMonth {
            month: input.to_string(),
        };

        let (year_part, month_part) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year_part.len() != 4
            || month_part.len() != 2
            || !year_part.bytes().all(|b| b.is_ascii_digit())
            || !month_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(Self {
            key: trimmed.to_string(),
            year,
            month,
        })
    }

    /// The month containing `date`
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            key: format!("{:04}-{:02}", date.year(), date.month()),
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in local time
    #[must_use]
    pub fn current() -> Self {
        Self::from_date(today())
    }

    /// The `YYYY-MM` string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Whether a stored `YYYY-MM-DD` date string falls in this month.
    #[must_use]
    pub fn contains(&self, date: &str) -> bool {
        date.strip_prefix(self.key.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
    }

    /// The first calendar day of the month
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Number of calendar days in the month (28..=31)
    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        let next_first = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };

        match (self.first_day(), next_first) {
            (Some(first), Some(next)) => {
                u32::try_from(next.signed_duration_since(first).num_days()).unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Human label such as "May 2024"
    #[must_use]
    pub fn label(&self) -> String {
        self.first_day()
            .map_or_else(|| self.key.clone(), |d| d.format("%B %Y").to_string())
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Today's date in local time
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a strict `YYYY-MM-DD` date.
///
/// # Errors
/// Returns [`Error::InvalidDate`] for anything else, including valid dates
/// written without zero padding.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.len() != 10 {
        return Err(Error::InvalidDate {
            date: input.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| Error::InvalidDate {
        date: input.to_string(),
    })
}

/// Formats a date as `YYYY-MM-DD`
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_valid_month() {
        let month = MonthKey::parse("2024-05").unwrap();
        assert_eq!(month.as_str(), "2024-05");
        assert_eq!(month.label(), "May 2024");
    }

    #[test]
    fn test_parse_invalid_months() {
        for bad in ["2024-13", "2024-00", "2024-5", "24-05", "2024/05", "", "2024-05-01"] {
            assert!(
                matches!(MonthKey::parse(bad), Err(Error::InvalidMonth { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_contains_is_prefix_match() {
        let month = MonthKey::parse("2024-01").unwrap();
        assert!(month.contains("2024-01-05"));
        assert!(month.contains("2024-01-31"));
        assert!(!month.contains("2024-02-01"));
        assert!(!month.contains("2023-01-05"));
        assert!(!month.contains("2024-013-05"));
        assert!(!month.contains("2024-01"));
        assert!(!month.contains(""));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(MonthKey::parse("2024-02").unwrap().days_in_month(), 29);
        assert_eq!(MonthKey::parse("2023-02").unwrap().days_in_month(), 28);
        assert_eq!(MonthKey::parse("2024-12").unwrap().days_in_month(), 31);
        assert_eq!(MonthKey::parse("2024-04").unwrap().days_in_month(), 30);
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(MonthKey::from_date(date).as_str(), "2024-03");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-05-20").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
        );
        assert!(matches!(parse_date("2024-5-20"), Err(Error::InvalidDate { .. })));
        assert!(matches!(parse_date("2024-02-30"), Err(Error::InvalidDate { .. })));
        assert_eq!(format_date(parse_date("2024-05-20").unwrap()), "2024-05-20");
    }
}
