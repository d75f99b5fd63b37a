use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

/// Return the first candidate key holding a usable value.
/// `null` and empty strings count as absent.
pub fn lookup<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| match item.get(*key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    })
}

/// Resolve a textual field. Numbers are rendered with their JSON form.
pub fn lookup_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn lookup_str_or(item: &Value, keys: &[&str], default: &str) -> String {
    lookup_str(item, keys).unwrap_or_else(|| default.to_string())
}

pub fn lookup_bool(item: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| item.get(*key)?.as_bool())
}

pub fn lookup_decimal(item: &Value, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    })
}

pub fn lookup_timestamp(item: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| parse_timestamp(item.get(*key)?))
}

/// Parse plain or scientific decimal text.
pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse decimal text, treating anything unparsable as zero.
pub fn decimal_or_zero(s: &str) -> Decimal {
    parse_decimal(s).unwrap_or(Decimal::ZERO)
}

/// Render with exactly 6 decimal places. Values too wide to carry six
/// fractional digits in a `Decimal` are padded textually.
pub fn format_fixed6(value: Decimal) -> String {
    let mut rounded = value.round_dp(6);
    rounded.rescale(6);

    let mut text = rounded.to_string();
    let scale = rounded.scale() as usize;
    if scale < 6 {
        if scale == 0 {
            text.push('.');
        }
        text.extend(std::iter::repeat('0').take(6 - scale));
    }
    text
}

/// Epoch seconds, epoch milliseconds (> 1e12), numeric strings or RFC 3339.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            from_epoch(secs)
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(secs) = s.parse::<i64>() {
                return from_epoch(secs);
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    // If >1e12, it's milliseconds
    if secs > 1_000_000_000_000 {
        DateTime::from_timestamp(secs / 1000, ((secs % 1000) * 1_000_000) as u32)
    } else {
        DateTime::from_timestamp(secs, 0)
    }
}
