//! Record normalizers
//!
//! One module per external schema. Each turns a loosely-structured upstream
//! record into a fixed-shape view model and never fails: missing or malformed
//! fields resolve to literal fallbacks (`"N/A"`, `"Unknown"`, `0`, ...).
//!
//! All displayed dates use `NormalizeContext::offset`, which stands in for the
//! viewer's local time. No other timezone handling is done.

pub mod appointment;
pub mod call;
pub mod campaign;
pub mod followup;
pub mod lead;
pub mod message;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::Vertical;
use crate::types::SheetRecord;

pub const NOT_AVAILABLE: &str = "N/A";

/// Inputs every normalizer may need besides the record itself
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext {
    pub vertical: Vertical,
    pub offset: FixedOffset,
    pub now: DateTime<Utc>,
}

impl NormalizeContext {
    pub fn new(vertical: Vertical, offset: FixedOffset, now: DateTime<Utc>) -> Self {
        Self { vertical, offset, now }
    }

    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.local(self.now).date_naive()
    }
}

// ============================================================================
// Display formatting
// ============================================================================

/// `10/7/2026`
pub fn format_date(at: &DateTime<FixedOffset>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

/// `09:05 AM`
pub fn format_time(at: &DateTime<FixedOffset>) -> String {
    at.format("%I:%M %p").to_string()
}

/// `m:ss` from milliseconds; negative spans clamp to `0:00`
pub fn format_minutes_seconds(ms: i64) -> String {
    let ms = ms.max(0);
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` taken as midnight at `offset`
pub fn parse_timestamp(s: &str, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(offset));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    offset
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .single()
}

// ============================================================================
// Lenient value access
// ============================================================================

fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

/// Non-blank string at `path`
pub fn text<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    at(value, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

static FLOAT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid regex"));
static INT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[+-]?\d+").expect("valid regex"));

/// Leading decimal number of `s`, ignoring trailing garbage (`"12.5%"` → 12.5)
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    FLOAT_PREFIX
        .find(s)
        .and_then(|m| m.as_str().trim().parse().ok())
}

/// Leading integer of `s` (`"5 leads"` → 5, `"7.9"` → 7)
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    INT_PREFIX
        .find(s)
        .and_then(|m| m.as_str().trim().parse().ok())
}

/// Number at `path`; accepts JSON numbers and numeric strings
pub fn float(value: &Value, path: &[&str]) -> Option<f64> {
    match at(value, path)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Integer at `path`; fractional numbers truncate
pub fn int(value: &Value, path: &[&str]) -> Option<i64> {
    match at(value, path)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Header names compare case-insensitively, with `_` and runs of spaces
/// treated as a single space.
fn header_key(header: &str) -> String {
    header
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First non-blank cell whose header matches one of `aliases` (in alias order)
pub fn field(record: &SheetRecord, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        record.iter().find_map(|(header, value)| {
            if header_key(header) != *alias {
                return None;
            }
            let cell = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            (!cell.is_empty()).then_some(cell)
        })
    })
}

/// Record id: the synthetic `id` column when present, else `index + 1`
pub fn record_id(record: &SheetRecord, index: usize) -> i64 {
    record
        .get("id")
        .and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(index as i64 + 1)
}
