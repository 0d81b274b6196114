// File: crates/chart-data/src/value.rs
// Summary: Raw value helpers: item value extraction, numeric/date parsing, id/name formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::types::DimensionType;

/// A single raw cell handed from a data provider to the store.
#[derive(Clone, Copy, Debug)]
pub enum RawCell<'a> {
    Json(&'a Value),
    Number(f64),
    Missing,
}

impl<'a> RawCell<'a> {
    pub fn is_missing(&self) -> bool {
        matches!(self, RawCell::Missing | RawCell::Json(Value::Null))
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            RawCell::Json(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// The `value` of an object item, or the item itself.
pub fn data_item_value(item: &Value) -> &Value {
    match item {
        Value::Object(map) => map.get("value").unwrap_or(item),
        _ => item,
    }
}

/// First entry that is not null, scanning from the front.
pub fn first_data_not_null(items: &[Value]) -> Option<&Value> {
    items.iter().find(|item| !item.is_null())
}

/// Convert a raw cell into the numeric storage value of a non-ordinal dimension.
/// Missing cells, empty strings, `"-"` and unparsable text all become `NaN`.
pub fn parse_data_value(cell: RawCell<'_>, dim_type: DimensionType) -> f64 {
    match cell {
        RawCell::Number(n) => n,
        RawCell::Missing => f64::NAN,
        RawCell::Json(v) => match v {
            Value::Null => f64::NAN,
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::Bool(b) => if *b { 1.0 } else { 0.0 },
            Value::String(s) => {
                if s.is_empty() || s == "-" {
                    return f64::NAN;
                }
                if dim_type == DimensionType::Time {
                    parse_date(s).unwrap_or_else(|| js_number(s))
                } else {
                    js_number(s)
                }
            }
            Value::Array(_) | Value::Object(_) => f64::NAN,
        },
    }
}

/// Numeric reading of a string with script-style leniency: surrounding whitespace is ignored,
/// blank text is 0, hex literals and `Infinity` are accepted, anything else is `NaN`.
pub fn js_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).map(|v| v as f64).unwrap_or(f64::NAN);
    }
    // Rust accepts "inf"/"nan" spellings that should stay non-numeric here.
    if t.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

const DATE_TIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parse a date string into epoch milliseconds. Strings without an offset are read as UTC.
pub fn parse_date(s: &str) -> Option<f64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis() as f64);
    }
    for fmt in DATE_TIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc().timestamp_millis() as f64);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return date_millis(d);
        }
    }
    // Year-month and bare year.
    let parts: Vec<&str> = s.split(['-', '/']).collect();
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    match parts.as_slice() {
        [y, m] if y.len() == 4 && all_digits(y) && all_digits(m) => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1).and_then(date_millis)
        }
        [y] if y.len() == 4 && all_digits(y) => {
            NaiveDate::from_ymd_opt(y.parse().ok()?, 1, 1).and_then(date_millis)
        }
        _ => None,
    }
}

fn date_millis(d: NaiveDate) -> Option<f64> {
    d.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc().timestamp_millis() as f64)
}

/// Render a number the way ids and names are displayed: integral values have no fraction.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// Convert an option `id`/`name` value to a string; null stays absent.
pub fn format_id_name(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(format_number),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
