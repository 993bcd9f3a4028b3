//! Patient/customer types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person the voice agent has talked to, keyed by phone number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub total_calls: usize,
    pub last_call: Option<DateTime<Utc>>,
    pub status: String,
    #[serde(default)]
    pub manual_entry: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Manual patient entry from the dashboard form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub last_visit: Option<String>,
    #[serde(default)]
    pub insurance: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientStats {
    pub total: usize,
    pub active_this_week: usize,
    pub new_this_month: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientListResponse {
    pub patients: Vec<Patient>,
    pub stats: PatientStats,
}
