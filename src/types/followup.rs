//! Follow-up types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpStatus {
    Pending,
    Scheduled,
    Completed,
    Overdue,
}

impl FollowUpStatus {
    /// Unrecognized or blank values are treated as pending.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Self::Scheduled,
            "completed" | "done" => Self::Completed,
            "overdue" => Self::Overdue,
            _ => Self::Pending,
        }
    }
}

/// Follow-up task view model (post-treatment check-in, review request, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub status: FollowUpStatus,
    #[serde(rename = "type")]
    pub kind: String,
    pub detail: String,
    pub schedule: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpStats {
    pub total: usize,
    pub pending: usize,
    pub scheduled: usize,
    pub completed: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpSummaryResponse {
    pub follow_ups: Vec<FollowUp>,
    pub stats: FollowUpStats,
}
