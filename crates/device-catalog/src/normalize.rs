//! Resolution of loosely-keyed catalog attributes.
//!
//! Upstream entries spell the same attribute several ways (`color`, `Colour`,
//! `Strap Colour`, ...). Each attribute has an ordered list of candidate keys;
//! the first key present in the entry wins, even when its value is null.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

/// Candidate keys for the color attribute, highest priority first.
pub const COLOR_KEYS: &[&str] = &["color", "Color", "Colour", "Strap Colour", "strap_colour"];

/// Candidate keys for the capacity attribute, highest priority first.
pub const CAPACITY_KEYS: &[&str] = &[
    "capacity",
    "Capacity",
    "capacity GB",
    "Capacity GB",
    "storage",
    "Storage",
];

/// Unit appended to numeric capacities.
const CAPACITY_UNIT: &str = "GB";

/// Returns the value of the first candidate key present in `data`.
///
/// A present key with a null value is still a match: the caller sees
/// `Some(Value::Null)` and lower-priority candidates are not consulted.
pub fn first_present<'a>(data: &'a Map<String, Value>, candidates: &[&str]) -> Option<&'a Value> {
    candidates.iter().find_map(|key| data.get(*key))
}

/// Resolve the color attribute of a `data` map.
pub fn color(data: &Map<String, Value>) -> Option<String> {
    match first_present(data, COLOR_KEYS)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Resolve the capacity attribute of a `data` map.
///
/// Text is kept verbatim, numbers become `"<n> GB"`.
pub fn capacity(data: &Map<String, Value>) -> Option<String> {
    match first_present(data, CAPACITY_KEYS)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format!("{} {CAPACITY_UNIT}", plain_decimal(n))),
        other => Some(other.to_string()),
    }
}

/// Render a JSON number in plain decimal notation (never exponent form).
///
/// Values outside `Decimal`'s range or scale go through `f64`, whose
/// `Display` prints every digit.
fn plain_decimal(n: &Number) -> String {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(|d| d.to_string())
        .ok()
        .or_else(|| n.as_f64().map(|f| f.to_string()))
        .unwrap_or(text)
}
