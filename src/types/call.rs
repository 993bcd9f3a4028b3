//! Voice-agent call types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Call outcome derived from the platform's end reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Completed,
    #[serde(rename = "Customer Ended")]
    CustomerEnded,
    Error,
    Ended,
    Unknown,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::CustomerEnded => "Customer Ended",
            Self::Error => "Error",
            Self::Ended => "Ended",
            Self::Unknown => "Unknown",
        }
    }
}

/// One turn of the call conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

/// Call view model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub date: String,
    pub time: String,
    /// `m:ss`, or `N/A` without both timestamps
    pub duration: String,
    pub duration_ms: Option<i64>,
    pub outcome: CallOutcome,
    pub language: String,
    /// Table preview, at most 200 characters plus an ellipsis
    pub transcript: String,
    pub full_transcript: String,
    pub messages: Vec<CallMessage>,
    pub summary: String,
    pub status: Option<String>,
    pub ended_reason: Option<String>,
    pub recording_url: Option<String>,
    pub cost: Option<f64>,
    pub assistant_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStats {
    pub total_calls: usize,
    pub completed_calls: usize,
    pub active_calls: usize,
    pub success_rate: u32,
    pub avg_duration: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallListResponse {
    pub calls: Vec<Call>,
    pub stats: CallStats,
}

/// Query for call listings
#[derive(Debug, Clone, Deserialize)]
pub struct CallListQuery {
    #[serde(default = "default_call_limit")]
    pub limit: u32,
}

fn default_call_limit() -> u32 {
    crate::defaults::DEFAULT_CALL_LIMIT
}

/// Body of `POST /api/vapi/initiate-call`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateCallRequest {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "procedure_interest")]
    pub procedure_interest: Option<String>,
    #[serde(default)]
    pub variables: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_label_matches_wire_name() {
        for outcome in [
            CallOutcome::Completed,
            CallOutcome::CustomerEnded,
            CallOutcome::Error,
            CallOutcome::Ended,
            CallOutcome::Unknown,
        ] {
            let wire = serde_json::to_value(outcome).unwrap();
            assert_eq!(wire, outcome.as_str());
        }
    }
}
