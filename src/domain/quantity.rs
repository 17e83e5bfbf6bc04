//! Cargo quantity normalization.
//!
//! Delivery reports record `qty_tons` as numbers, numeric strings, strings
//! with a comma decimal separator, or not at all. Every shape is reduced to a
//! non-negative `f64`; anything unusable becomes `0.0` and is reported as a
//! [`QuantityIssue`] so the caller can log it.

use std::fmt;

use serde_json::Value;

/// Why a raw quantity was coerced to zero.
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityIssue {
    /// Field absent or null.
    Missing,
    /// Field present but not a number.
    NonNumeric(String),
    /// Field parsed to a negative or non-finite number.
    OutOfRange(f64),
}

impl fmt::Display for QuantityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing quantity"),
            Self::NonNumeric(raw) => write!(f, "non-numeric quantity '{raw}'"),
            Self::OutOfRange(value) => write!(f, "out-of-range quantity {value}"),
        }
    }
}

/// Result of normalizing one raw quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Tons {
    /// Clean, non-negative value.
    pub value: f64,
    /// Set when the raw value had to be coerced.
    pub issue: Option<QuantityIssue>,
}

impl Tons {
    fn clean(value: f64) -> Self {
        Self { value, issue: None }
    }

    fn coerced(issue: QuantityIssue) -> Self {
        Self { value: 0.0, issue: Some(issue) }
    }
}

/// Normalize a raw quantity string (`"1,5"` → `1.5`).
#[must_use]
pub fn parse_tons(raw: &str) -> Tons {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Tons::coerced(QuantityIssue::Missing);
    }
    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(value) => check_range(value),
        Err(_) => Tons::coerced(QuantityIssue::NonNumeric(raw.to_string())),
    }
}

/// Normalize a raw JSON quantity.
#[must_use]
pub fn tons_from_value(value: Option<&Value>) -> Tons {
    match value {
        None | Some(Value::Null) => Tons::coerced(QuantityIssue::Missing),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) => check_range(v),
            None => Tons::coerced(QuantityIssue::NonNumeric(n.to_string())),
        },
        Some(Value::String(s)) => parse_tons(s),
        Some(other) => Tons::coerced(QuantityIssue::NonNumeric(other.to_string())),
    }
}

fn check_range(value: f64) -> Tons {
    if value.is_finite() && value >= 0.0 {
        Tons::clean(value)
    } else {
        Tons::coerced(QuantityIssue::OutOfRange(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comma_decimal_is_normalized() {
        assert_eq!(parse_tons("1,5"), Tons { value: 1.5, issue: None });
    }

    #[test]
    fn negative_becomes_zero() {
        let tons = tons_from_value(Some(&json!(-3)));
        assert_eq!(tons.value, 0.0);
        assert_eq!(tons.issue, Some(QuantityIssue::OutOfRange(-3.0)));
    }

    #[test]
    fn null_and_missing_become_zero() {
        assert_eq!(tons_from_value(Some(&Value::Null)).value, 0.0);
        assert_eq!(tons_from_value(None).issue, Some(QuantityIssue::Missing));
    }

    #[test]
    fn garbage_becomes_zero() {
        let tons = parse_tons("about ten");
        assert_eq!(tons.value, 0.0);
        assert!(matches!(tons.issue, Some(QuantityIssue::NonNumeric(_))));
        assert_eq!(parse_tons("NaN").value, 0.0);
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(tons_from_value(Some(&json!(42.25))).value, 42.25);
        assert_eq!(tons_from_value(Some(&json!("7"))).value, 7.0);
    }
}
