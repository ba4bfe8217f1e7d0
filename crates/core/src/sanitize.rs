//! Tolerant numeric coercion for catalog rows.
//!
//! Catalog rows come from spreadsheets, ERP exports and hand-edited seeds, so
//! price, cost and stock may be missing, textual, or garbage. Every such value
//! is funneled through the functions below, which never fail: anything that
//! is not a usable non-negative number becomes zero.
//!
//! Accepted textual forms:
//! - plain decimals: `"12.5"`, `" 7 "`
//! - decimal comma: `"12,5"`
//! - thousands dots with decimal comma: `"1.234,56"`
//! - an optional `R$` / `$` prefix
//!
//! Amounts are capped at [`MAX_AMOUNT`], the largest value a `NUMERIC(12, 2)`
//! price column holds, so every backend stores what the core computed with.

use serde_json::Value;

/// Largest monetary amount kept; larger inputs are clamped down to it.
pub const MAX_AMOUNT: f64 = 9_999_999_999.99;

/// Parse a monetary amount. Returns a finite value in `0.0..=MAX_AMOUNT`,
/// `0.0` on any parse failure.
pub fn parse_money(raw: &Value) -> f64 {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    };
    sanitize_amount(parsed)
}

/// Parse a stock quantity. Returns a non-negative integer, `0` on any parse
/// failure. Fractional quantities are truncated toward zero.
pub fn parse_stock(raw: &Value) -> i64 {
    let parsed = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_decimal_str(s)
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    };
    sanitize_quantity(parsed)
}

/// Clamp an optional amount (e.g. a nullable `NUMERIC` column) into
/// `0.0..=MAX_AMOUNT`.
pub fn sanitize_amount(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() && v > 0.0 => v.min(MAX_AMOUNT),
        _ => 0.0,
    }
}

/// Clamp an optional quantity into the non-negative range.
pub fn sanitize_quantity(raw: Option<i64>) -> i64 {
    raw.unwrap_or(0).max(0)
}

fn parse_decimal_str(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let s = s
        .strip_prefix("R$")
        .or_else(|| s.strip_prefix('$'))
        .unwrap_or(s)
        .trim();
    if s.is_empty() {
        return None;
    }

    let normalized = if s.contains(',') {
        // Decimal comma; any dots are thousands separators.
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };

    normalized.parse::<f64>().ok()
}
