//! Lenient scalar coercions for markup-sourced values.
//!
//! Attribute strings and loosely typed JSON fields arrive from templates that were never
//! type-checked, so these helpers mirror how a browser script would read them.

use serde_json::Value;

/// Parse the leading integer of `s`, ignoring leading whitespace and any trailing garbage.
///
/// `"12px"` yields `12`, `" -3"` yields `-3`, `"px"` and `""` yield `None`. Digit runs past the
/// `i64` range saturate.
pub(crate) fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .as_bytes()
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let signed = if negative {
        format!("-{}", &digits[..end])
    } else {
        digits[..end].to_owned()
    };
    Some(signed.parse().unwrap_or(if negative { i64::MIN } else { i64::MAX }))
}

/// Numeric coercion of a JSON value. Returns `NaN` for values with no numeric reading.
///
/// Numbers pass through, strings are trimmed and parsed (empty means `0`), booleans map to
/// `1`/`0` and `null` maps to `0`. Arrays and objects are not numbers.
pub(crate) fn coerce_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                0.0
            } else {
                t.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}
