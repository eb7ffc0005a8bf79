//! Lenient decoding for stored ledger records.
//!
//! Stored JSON may have been written by older versions or edited by hand, so
//! numeric fields coerce anything non-numeric to zero instead of failing. Records
//! are decoded one at a time: a record whose shape is broken (no `id`, no `date`)
//! is skipped and logged, and the rest of the ledger still loads.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Coerces a JSON value to a finite number, treating everything else as zero.
///
/// Numeric strings are parsed, booleans count as 1 or 0, and an empty string,
/// `null`, non-finite values, arrays, and objects all become 0.
#[must_use]
pub fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };

    if number.is_finite() { number } else { 0.0 }
}

/// `deserialize_with` adapter for coerce-to-zero numeric fields.
pub fn number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0.0, coerce_number))
}

/// `deserialize_with` adapter for required text fields such as `id` and `date`.
///
/// Empty strings are rejected so the enclosing record is skipped.
pub fn required_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected non-empty text, found {other}"
        ))),
    }
}

/// `deserialize_with` adapter for nullable foreign keys.
///
/// `null`, missing, and empty strings all mean "no helper".
pub fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `deserialize_with` adapter for free text that may be missing or `null`.
pub fn text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Decodes a stored JSON array record by record, skipping malformed records.
#[must_use]
pub fn decode_records<T>(raw: Option<Value>, ledger: &str) -> Vec<T>
where
    T: DeserializeOwned,
{
    let items = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            tracing::warn!(ledger, "Stored ledger is not a list, ignoring it");
            return Vec::new();
        }
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(ledger, index, "Skipping malformed record: {e}");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(ledger, "Loaded {} of {} records", records.len(), total);
    }
    records
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "required_text")]
        id: String,
        #[serde(default, deserialize_with = "number")]
        amount: f64,
        #[serde(default, deserialize_with = "optional_id")]
        owner: Option<String>,
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12.5)), 12.5);
        assert_eq!(coerce_number(&json!("40")), 40.0);
        assert_eq!(coerce_number(&json!(" 7.5 ")), 7.5);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!([1, 2])), 0.0);
        assert_eq!(coerce_number(&json!("NaN")), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
    }

    #[test]
    fn test_decode_records_skips_malformed() {
        let raw = json!([
            {"id": "a", "amount": "25", "owner": ""},
            {"amount": 10},
            {"id": "", "amount": 10},
            {"id": "b", "amount": "oops", "owner": "h_1"},
            "not an object"
        ]);

        let records: Vec<Sample> = decode_records(Some(raw), "sample");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].amount, 25.0);
        assert!(records[0].owner.is_none());
        assert_eq!(records[1].amount, 0.0);
        assert_eq!(records[1].owner.as_deref(), Some("h_1"));
    }

    #[test]
    fn test_decode_records_non_list() {
        let records: Vec<Sample> = decode_records(Some(json!({"id": "a"})), "sample");
        assert!(records.is_empty());
        let records: Vec<Sample> = decode_records(None, "sample");
        assert!(records.is_empty());
    }
}
