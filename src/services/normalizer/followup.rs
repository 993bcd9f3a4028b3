//! Follow-up sheet rows → `FollowUp`

use super::{field, record_id, NormalizeContext, NOT_AVAILABLE};
use crate::types::{FollowUp, FollowUpStatus, SheetRecord};

const NAME: &[&str] = &["name", "full name", "patient name", "customer name", "patient", "customer"];
const PHONE: &[&str] = &["phone", "phone number", "mobile"];
const STATUS: &[&str] = &["status"];
const KIND: &[&str] = &["type", "follow-up type", "follow up type", "reason"];
const DETAIL: &[&str] = &["detail", "details", "treatment", "service", "notes"];
const SCHEDULE: &[&str] = &["schedule", "scheduled for", "due", "due date", "date"];

pub fn followup_from_record(record: &SheetRecord, index: usize, ctx: &NormalizeContext) -> FollowUp {
    FollowUp {
        id: record_id(record, index),
        name: field(record, NAME).unwrap_or_else(|| ctx.vertical.unknown_person().to_string()),
        phone: field(record, PHONE).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        status: field(record, STATUS)
            .map(|s| FollowUpStatus::parse(&s))
            .unwrap_or(FollowUpStatus::Pending),
        kind: field(record, KIND).unwrap_or_else(|| "Check-in".to_string()),
        detail: field(record, DETAIL).unwrap_or_default(),
        schedule: field(record, SCHEDULE).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}
