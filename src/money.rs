//! Minor-currency amount handling.
//!
//! All arithmetic in this crate runs on integer cents. Decimal strings
//! appear in two places only: admin-entered shipping option prices and
//! the amounts sent to providers that want two-decimal strings (PayPal,
//! Sendcloud). This module is the single conversion point.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Parses a decimal amount string into integer cents.
///
/// Accepts both comma and dot as the decimal separator ("12,50" and
/// "12.50" both parse to 1250). Returns `None` on unparseable or
/// negative input; callers decide whether that is an error.
pub fn parse_cents(raw: &str) -> Option<i64> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    let amount = Decimal::from_str_exact(&normalized).ok()?;
    decimal_to_cents(amount)
}

/// Normalizes a JSON value of unknown shape (string or number) into
/// integer cents. Pure; never panics.
pub fn normalize_amount(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::String(s) => parse_cents(s),
        serde_json::Value::Number(n) => {
            let f = n.as_f64()?;
            if !f.is_finite() {
                return None;
            }
            decimal_to_cents(Decimal::from_f64(f)?)
        }
        _ => None,
    }
}

/// Formats cents as a two-decimal fixed string ("4.90") for providers
/// that take decimal amounts on the wire.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn decimal_to_cents(amount: Decimal) -> Option<i64> {
    if amount.is_sign_negative() {
        return None;
    }
    // Round half-up to whole cents; "4.905" becomes 491.
    let cents = (amount * Decimal::from(100)).round();
    cents.to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comma_and_dot_separators_agree() {
        assert_eq!(parse_cents("12,50"), Some(1250));
        assert_eq!(parse_cents("12.50"), Some(1250));
        assert_eq!(parse_cents(" 4.90 "), Some(490));
        assert_eq!(parse_cents("0"), Some(0));
        assert_eq!(parse_cents("100"), Some(10000));
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert_eq!(parse_cents(""), None);
        assert_eq!(parse_cents("abc"), None);
        assert_eq!(parse_cents("12.5.0"), None);
        assert_eq!(parse_cents("-3.20"), None);
    }

    #[test]
    fn rounds_half_up_to_whole_cents() {
        assert_eq!(parse_cents("4.905"), Some(491));
        assert_eq!(parse_cents("4.904"), Some(490));
    }

    #[test]
    fn normalizes_json_strings_and_numbers() {
        assert_eq!(normalize_amount(&json!("12,50")), Some(1250));
        assert_eq!(normalize_amount(&json!(12.5)), Some(1250));
        assert_eq!(normalize_amount(&json!(12)), Some(1200));
        assert_eq!(normalize_amount(&json!(null)), None);
        assert_eq!(normalize_amount(&json!(["12.50"])), None);
        assert_eq!(normalize_amount(&json!(-1.0)), None);
    }

    #[test]
    fn formats_two_decimal_strings() {
        assert_eq!(format_cents(490), "4.90");
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(10000), "100.00");
    }
}
