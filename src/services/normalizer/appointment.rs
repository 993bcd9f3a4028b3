//! Calendar events → `Appointment`
//!
//! Events carry no structured customer field. The name and service are
//! recovered from the summary (`"Cleaning - John Doe"`, `"Leak repair: Ann"`)
//! or from labelled lines in the description (`Patient: John Doe`,
//! `Service Type: Drain cleaning`). Best effort only.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{format_date, format_time, parse_timestamp, NormalizeContext, NOT_AVAILABLE};
use crate::types::{Appointment, CalendarEvent};

static CUSTOMER_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:patient|customer|client|name)\s*:[ \t]*([^\r\n]*)").expect("valid regex")
});
static SERVICE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:service type|service|treatment)\s*:[ \t]*([^\r\n]*)").expect("valid regex")
});

const DEFAULT_STATUS: &str = "confirmed";

/// Split on the first `-` or `:`. The left part is the service; the right
/// part, up to the next occurrence of the same delimiter, is the customer.
/// Both halves must be non-blank.
pub fn split_summary(summary: &str) -> Option<(String, String)> {
    let delimiter = summary.chars().find(|c| *c == '-' || *c == ':')?;
    let mut parts = summary.split(delimiter);
    let left = parts.next().unwrap_or_default().trim();
    let right = parts.next().unwrap_or_default().trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left.to_string(), right.to_string()))
}

fn labelled(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn appointment_from_event(event: &CalendarEvent, ctx: &NormalizeContext) -> Appointment {
    let summary = event.summary.trim();

    let (service, customer) = match split_summary(summary) {
        Some(parts) => parts,
        None => {
            let customer = labelled(&CUSTOMER_LABEL, &event.description)
                .unwrap_or_else(|| ctx.vertical.unknown_person().to_string());
            let service = labelled(&SERVICE_LABEL, &event.description)
                .or_else(|| (!summary.is_empty()).then(|| summary.to_string()))
                .unwrap_or_else(|| ctx.vertical.default_service().to_string());
            (service, customer)
        }
    };

    let starts_at = parse_timestamp(&event.start, &ctx.offset);
    let ends_at = parse_timestamp(&event.end, &ctx.offset);

    let duration = match (starts_at, ends_at) {
        (Some(start), Some(end)) => {
            let minutes = (end - start).num_milliseconds() as f64 / 60_000.0;
            format!("{} min", minutes.round() as i64)
        }
        _ => NOT_AVAILABLE.to_string(),
    };

    let status = match event.status.trim() {
        "" => DEFAULT_STATUS.to_string(),
        s => s.to_string(),
    };

    Appointment {
        id: event.id.clone(),
        customer,
        service,
        date: starts_at.as_ref().map(format_date).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        time: starts_at.as_ref().map(format_time).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        duration,
        status,
        notes: event.description.clone(),
        link: event.html_link.clone(),
        starts_at,
    }
}
