//! Alias-list accessors for heterogeneous backend records.
//!
//! Different generations of the remote API spell the same logical field
//! differently (`patient_id` vs `patientId` vs `user_id`). Rather than
//! optional-chaining at every call site, each logical field is read
//! through one of these helpers with an ordered list of known aliases;
//! the first alias that yields a usable value wins.

use chrono::NaiveDate;
use serde_json::Value;

/// First non-empty string under any of the aliases. Bare numbers are
/// stringified so numeric ids normalize cleanly.
pub fn str_field(record: &Value, aliases: &[&str]) -> Option<String> {
    for alias in aliases {
        match record.get(alias) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// First numeric value under any of the aliases. String-encoded numbers
/// ("1500.00") are coerced, matching the lenient parsing of the backend's
/// own consumers.
pub fn num_field(record: &Value, aliases: &[&str]) -> Option<f64> {
    for alias in aliases {
        match record.get(alias) {
            Some(Value::Number(n)) => return n.as_f64(),
            Some(Value::String(s)) => {
                if let Ok(n) = s.trim().parse::<f64>() {
                    return Some(n);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn bool_field(record: &Value, aliases: &[&str]) -> Option<bool> {
    for alias in aliases {
        if let Some(b) = record.get(alias).and_then(Value::as_bool) {
            return Some(b);
        }
    }
    None
}

/// First parseable ISO-8601 date under any of the aliases. Timestamps
/// with a time component are truncated to their date part.
pub fn date_field(record: &Value, aliases: &[&str]) -> Option<NaiveDate> {
    for alias in aliases {
        if let Some(Value::String(s)) = record.get(alias) {
            let day = s.trim();
            let day = day.get(..10).unwrap_or(day);
            if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }
    None
}

pub fn array_field<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a Vec<Value>> {
    for alias in aliases {
        if let Some(rows) = record.get(alias).and_then(Value::as_array) {
            return Some(rows);
        }
    }
    None
}
