//! Lenient numeric deserialization for hand-entered case fields.
//!
//! The data store keeps budget and impacted-people columns as loosely
//! typed values: numbers, numeric strings, Brazilian-formatted amounts
//! (`"R$ 1.500,50"`) and the occasional free-text note. Anything that
//! does not read as a finite number becomes `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};

/// Integers grouped with `.` thousands separators (`"45.000"`, `"1.234.567"`).
static DOTTED_THOUSANDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}(\.[0-9]{3})+$").expect("valid regex"));

/// Reads a finite number from a loosely typed JSON value.
#[must_use]
pub fn parse_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_number_str(s),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Reads a finite number from text.
///
/// Accepts plain decimals (`"1500.5"`) and Brazilian notation with a
/// currency prefix, `.` thousands separators and a `,` decimal mark.
/// Without a `,`, a dot followed by exactly three-digit groups is read as
/// a thousands separator, so `"1.500"` is 1500.
#[must_use]
pub fn parse_number_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else if DOTTED_THOUSANDS_RE.is_match(trimmed) {
        trimmed.replace('.', "")
    } else {
        trimmed.to_string()
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Deserializes an optional amount, mapping malformed input to `None`.
///
/// # Errors
///
/// Only fails when the underlying deserializer cannot produce a JSON
/// value at all.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_number))
}

/// Deserializes an optional non-negative count, mapping malformed or
/// negative input to `None`. Fractional values are truncated.
///
/// # Errors
///
/// Only fails when the underlying deserializer cannot produce a JSON
/// value at all.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(parse_number)
        .filter(|v| *v >= 0.0)
        .map(|v| v.trunc() as u64))
}
