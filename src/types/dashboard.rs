//! Dashboard overview types

use serde::{Deserialize, Serialize};

use super::Appointment;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub appointments: usize,
    pub leads: usize,
    pub calls: usize,
    /// Ended calls over all calls, as a rounded percentage
    pub conversion_rate: u32,
}

/// Call row of the dashboard's "recent calls" card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCall {
    pub name: String,
    /// Relative, e.g. `5m ago`
    pub time: String,
    pub duration: String,
    pub outcome: String,
    pub language: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_calls: Vec<RecentCall>,
    pub recent_appointments: Vec<Appointment>,
}
