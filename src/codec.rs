// SPDX-License-Identifier: MIT

//! Shared record-decoding helpers.
//!
//! Remote records are flat `serde_json` maps with string, number, array,
//! and nested-map fields. Every entity codec is built from the helpers
//! here: access is strict, the first failing field (in the codec's
//! declared order) is reported, and the `"!"` sentinel stands in for
//! "no value" in schemas that cannot represent null.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{Result, SyncError};

/// A raw remote record.
pub type Record = Map<String, Value>;

/// Reserved literal meaning "field intentionally absent".
pub const SENTINEL: &str = "!";

/// The one timestamp format used process-wide, both directions.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Delimiter inside composite media strings (`<tag> – [path – ]<url>`).
pub const MEDIA_DELIMITER: &str = " – ";

/// Format a timestamp with the shared process-wide format.
pub fn format_timestamp(date: DateTime<Utc>) -> String {
    date.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp in the shared format. Mismatch is an error, never
/// a panic.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Current time truncated to whole seconds, so stored timestamps
/// round-trip through the shared format.
pub fn now_rounded() -> DateTime<Utc> {
    let now = Utc::now();
    parse_timestamp(&format_timestamp(now)).unwrap_or(now)
}

/// Required string field.
pub fn require_str(record: &Record, field: &str) -> Result<String> {
    match record.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(SyncError::missing(field)),
    }
}

/// Optional string field: absent or sentinel means `None`; a present
/// field of the wrong shape is still an error.
pub fn opt_str(record: &Record, field: &str) -> Result<Option<String>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s == SENTINEL => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        _ => Err(SyncError::missing(field)),
    }
}

/// Required non-negative integer, accepted as a native number or a
/// string-encoded integer (the external source stores numbers as text).
pub fn require_u32(record: &Record, field: &str) -> Result<u32> {
    match record.get(field) {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| SyncError::missing(field)),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| SyncError::missing(field)),
        _ => Err(SyncError::missing(field)),
    }
}

/// Required timestamp in the shared format.
pub fn require_timestamp(record: &Record, field: &str) -> Result<DateTime<Utc>> {
    let raw = require_str(record, field)?;
    parse_timestamp(&raw).ok_or_else(|| SyncError::missing(field))
}

/// Required list of strings.
pub fn require_str_list(record: &Record, field: &str) -> Result<Vec<String>> {
    match record.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(SyncError::missing(field)),
            })
            .collect(),
        _ => Err(SyncError::missing(field)),
    }
}

/// Optional list of strings. Absent, sentinel, or the one-element
/// sentinel list `["!"]` all mean empty.
pub fn opt_str_list(record: &Record, field: &str) -> Result<Vec<String>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(vec![]),
        Some(Value::String(s)) if s == SENTINEL => Ok(vec![]),
        Some(Value::Array(_)) => {
            let items = require_str_list(record, field)?;
            if items.len() == 1 && items[0] == SENTINEL {
                Ok(vec![])
            } else {
                Ok(items)
            }
        }
        _ => Err(SyncError::missing(field)),
    }
}

/// Optional nested object field; absent means empty.
pub fn opt_map<'a>(record: &'a Record, field: &str) -> Result<Option<&'a Record>> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::String(s)) if s == SENTINEL => Ok(None),
        _ => Err(SyncError::missing(field)),
    }
}
