//! Wire and payload types.
//!
//! Raw records mirror the upstream API verbatim (key names included); every
//! processed type serializes to the camelCase JSON the dashboard consumes.

pub mod funding;
pub mod listings;
pub mod parity;

use serde::{Deserialize, Serialize};

pub use funding::*;
pub use listings::*;
pub use parity::*;

// ── Loosely typed field ───────────────────────────────────────────────────────

/// A single upstream field value. The API mixes strings, numbers and
/// booleans freely, sometimes for the same key across rows. Arrays and
/// objects land in `Other` so one odd field never rejects the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    pub fn text(s: impl Into<String>) -> Self {
        RawValue::Text(s.into())
    }

    /// Trimmed textual form; numbers render without a trailing `.0`.
    /// Arrays join their scalar items with ", "; objects read as empty.
    pub fn as_text(&self) -> String {
        match self {
            RawValue::Bool(b) => b.to_string(),
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.trim().to_string(),
            RawValue::Other(serde_json::Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s.trim().to_string()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    serde_json::Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            RawValue::Other(_) => String::new(),
        }
    }

    /// Plain numeric reading: "1,234.5" and "12.5%" are accepted, suffixed
    /// amounts are not (see `transform::parsers::parse_amount`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) if n.is_finite() => Some(*n),
            RawValue::Number(_) | RawValue::Bool(_) | RawValue::Other(_) => None,
            RawValue::Text(s) => {
                let s = s.trim().replace([',', '%'], "");
                if s.is_empty() || s == "N/A" || s == "-" {
                    return None;
                }
                s.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
    }

    /// Presence flag semantics used by parity rows.
    pub fn is_truthy(&self) -> bool {
        match self {
            RawValue::Bool(b) => *b,
            RawValue::Number(n) => *n != 0.0,
            RawValue::Text(s) => matches!(
                s.trim().to_lowercase().as_str(),
                "true" | "yes" | "y" | "1" | "listed" | "x"
            ),
            RawValue::Other(_) => false,
        }
    }
}

/// Non-empty trimmed text of an optional field.
pub fn text_of(value: &Option<RawValue>) -> Option<String> {
    value
        .as_ref()
        .map(RawValue::as_text)
        .filter(|s| !s.is_empty())
}

/// Numeric reading of an optional field.
pub fn number_of(value: &Option<RawValue>) -> Option<f64> {
    value.as_ref().and_then(RawValue::as_f64)
}

// ── Response envelope ─────────────────────────────────────────────────────────

/// Upstream answers either with a bare array or with `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ApiEnvelope<T> {
    pub fn into_records(self) -> Vec<T> {
        match self {
            ApiEnvelope::Bare(records) | ApiEnvelope::Wrapped { data: records } => records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_untagged() {
        let vals: Vec<Option<RawValue>> =
            serde_json::from_str(r#"[true, 3.5, "abc", null]"#).unwrap();
        assert_eq!(vals[0], Some(RawValue::Bool(true)));
        assert_eq!(vals[1], Some(RawValue::Number(3.5)));
        assert_eq!(vals[2], Some(RawValue::text("abc")));
        assert_eq!(vals[3], None);
    }

    #[test]
    fn test_as_text_and_number() {
        assert_eq!(RawValue::Number(5.0).as_text(), "5");
        assert_eq!(RawValue::text("  hi ").as_text(), "hi");
        assert_eq!(RawValue::text("1,234.5").as_f64(), Some(1234.5));
        assert_eq!(RawValue::text("-12.5%").as_f64(), Some(-12.5));
        assert_eq!(RawValue::text("N/A").as_f64(), None);
        assert_eq!(RawValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_truthy() {
        assert!(RawValue::Bool(true).is_truthy());
        assert!(RawValue::Number(1.0).is_truthy());
        assert!(RawValue::text("Yes").is_truthy());
        assert!(RawValue::text("listed").is_truthy());
        assert!(!RawValue::text("no").is_truthy());
        assert!(!RawValue::text("").is_truthy());
        assert!(!RawValue::Number(0.0).is_truthy());
    }

    #[test]
    fn test_envelope_shapes() {
        let bare: ApiEnvelope<RawValue> = serde_json::from_str(r#"[1, "a"]"#).unwrap();
        assert_eq!(bare.into_records().len(), 2);
        let wrapped: ApiEnvelope<RawValue> = serde_json::from_str(r#"{"data": [true]}"#).unwrap();
        assert_eq!(wrapped.into_records(), vec![RawValue::Bool(true)]);
    }

    #[test]
    fn test_text_of_blank() {
        assert_eq!(text_of(&Some(RawValue::text("   "))), None);
        assert_eq!(text_of(&None), None);
    }

    #[test]
    fn test_nested_values_are_tolerated() {
        let vals: Vec<RawValue> =
            serde_json::from_str(r#"[["Binance", " OKX ", 3, null], {"x": 1}, []]"#).unwrap();
        assert_eq!(vals[0].as_text(), "Binance, OKX, 3");
        assert_eq!(vals[0].as_f64(), None);
        assert!(!vals[0].is_truthy());
        assert_eq!(text_of(&Some(vals[1].clone())), None);
        assert_eq!(text_of(&Some(vals[2].clone())), None);
    }

    #[test]
    fn test_envelope_survives_array_field() {
        let body = r#"{"data":[
            {"ticker":"AAA","exchanges":"Binance"},
            {"ticker":"BBB","exchanges":["Binance","OKX"],"extra":{"source":"feed"}}
        ]}"#;
        let rows = serde_json::from_str::<ApiEnvelope<RawListingRecord>>(body)
            .unwrap()
            .into_records();
        assert_eq!(rows.len(), 2);
        assert_eq!(text_of(&rows[1].exchanges).as_deref(), Some("Binance, OKX"));
    }
}
