//! Appointment types

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar event as served by `GET /api/appointments`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    /// RFC 3339 date-time, or a bare date for all-day events
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub html_link: String,
}

/// Appointment view model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    /// Patient (dental) or customer (plumbing) name
    pub customer: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub status: String,
    pub notes: String,
    pub link: String,
    /// Start in display time; `None` when the event had no parseable start
    pub starts_at: Option<DateTime<FixedOffset>>,
}

/// Calendar granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Day,
    Week,
    #[default]
    Month,
}

/// Query for `GET /api/appointments/calendar`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    #[serde(default)]
    pub view: CalendarView,
    /// Navigation cursor; today when absent
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Number of view-sized steps to move the cursor (negative = back)
    #[serde(default)]
    pub shift: i32,
}

/// Month layout: blank cells before day 1 (Sunday-first weeks) and length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub leading_blanks: u32,
    pub days_in_month: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub is_today: bool,
    pub appointments: Vec<Appointment>,
}

/// Day-view row holding the appointments that start within `hour`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourRow {
    pub hour: u32,
    pub label: String,
    pub appointments: Vec<Appointment>,
}

/// Response of `GET /api/appointments/calendar`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResponse {
    pub view: CalendarView,
    pub cursor: NaiveDate,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<MonthGrid>,
    pub days: Vec<DayCell>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hours: Vec<HourRow>,
}
