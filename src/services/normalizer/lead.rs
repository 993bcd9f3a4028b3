//! Lead-form rows → `Lead`

use chrono::{DateTime, NaiveDateTime, Utc};

use super::{field, format_date, format_time, record_id, NormalizeContext, NOT_AVAILABLE};
use crate::types::{CreateLeadRequest, Lead, LeadStatus, SheetRecord};

const NAME: &[&str] = &["name", "full name", "your name", "patient name", "customer name"];
const PHONE: &[&str] = &["phone", "phone number", "mobile", "mobile number", "contact number", "whatsapp number"];
const EMAIL: &[&str] = &["email", "email address", "e-mail"];
const SERVICE: &[&str] = &[
    "treatment",
    "service",
    "service type",
    "procedure",
    "procedure interest",
    "treatment interest",
    "projected treatment",
];
const BUDGET: &[&str] = &["budget", "estimated budget"];
const SOURCE: &[&str] = &["source", "lead source", "how did you hear about us?"];
const NOTES: &[&str] = &["notes", "message", "comments", "additional notes"];
const STATUS: &[&str] = &["status", "lead status"];
const DATE: &[&str] = &["date"];
const TIME: &[&str] = &["time"];
const TIMESTAMP: &[&str] = &["timestamp", "submitted at"];

const DEFAULT_SOURCE: &str = "Lead Form";
const MANUAL_SOURCE: &str = "Manual Entry";

/// Normalize one header-keyed sheet row. `index` is the row's position
/// after the header and only matters when the row carries no `id`.
pub fn lead_from_record(record: &SheetRecord, index: usize, ctx: &NormalizeContext) -> Lead {
    let (date, time) = submitted_at(record);

    Lead {
        id: record_id(record, index),
        name: field(record, NAME).unwrap_or_else(|| "Unknown".to_string()),
        phone: field(record, PHONE).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        email: field(record, EMAIL).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        service: field(record, SERVICE).unwrap_or_else(|| ctx.vertical.default_service().to_string()),
        budget: field(record, BUDGET).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        source: field(record, SOURCE).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        notes: field(record, NOTES).unwrap_or_default(),
        status: field(record, STATUS)
            .map(|s| LeadStatus::parse(&s))
            .unwrap_or_default(),
        date,
        time,
    }
}

/// Explicit date/time columns win; otherwise the Google Forms timestamp
/// (`M/D/YYYY H:MM:SS`) is split into its two halves.
fn submitted_at(record: &SheetRecord) -> (String, String) {
    let explicit_date = field(record, DATE);
    let explicit_time = field(record, TIME);
    if let (Some(date), Some(time)) = (&explicit_date, &explicit_time) {
        return (date.clone(), time.clone());
    }

    let (stamp_date, stamp_time) = match field(record, TIMESTAMP) {
        Some(stamp) => split_form_timestamp(&stamp),
        None => (None, None),
    };

    (
        explicit_date
            .or(stamp_date)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        explicit_time
            .or(stamp_time)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    )
}

fn split_form_timestamp(stamp: &str) -> (Option<String>, Option<String>) {
    if let Ok(dt) = NaiveDateTime::parse_from_str(stamp, "%m/%d/%Y %H:%M:%S") {
        return (
            Some(dt.format("%-m/%-d/%Y").to_string()),
            Some(dt.format("%I:%M %p").to_string()),
        );
    }
    match stamp.split_once(char::is_whitespace) {
        Some((date, time)) => (Some(date.to_string()), Some(time.trim().to_string())),
        None => (Some(stamp.to_string()), None),
    }
}

/// Lead typed into the dashboard form. The id is the creation instant in
/// epoch milliseconds, matching what the dashboard uses for unsaved rows.
pub fn lead_from_form(form: &CreateLeadRequest, now: DateTime<Utc>, ctx: &NormalizeContext) -> Lead {
    let local = ctx.local(now);
    let non_blank = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Lead {
        id: now.timestamp_millis(),
        name: form.name.trim().to_string(),
        phone: non_blank(&form.phone).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        email: non_blank(&form.email).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        service: non_blank(&form.service).unwrap_or_else(|| ctx.vertical.default_service().to_string()),
        budget: non_blank(&form.budget).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        source: non_blank(&form.source).unwrap_or_else(|| MANUAL_SOURCE.to_string()),
        notes: non_blank(&form.notes).unwrap_or_default(),
        status: LeadStatus::New,
        date: format_date(&local),
        time: format_time(&local),
    }
}
