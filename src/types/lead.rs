//! Lead types

use serde::{Deserialize, Serialize};

/// Lead pipeline status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Converted,
    /// Anything the intake sheet holds that is not one of the above
    #[serde(other)]
    Other,
}

impl Default for LeadStatus {
    fn default() -> Self {
        LeadStatus::New
    }
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Converted => "converted",
            Self::Other => "other",
        }
    }

    /// Blank means the lead has not been touched yet.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "new" => Self::New,
            "contacted" => Self::Contacted,
            "qualified" => Self::Qualified,
            "converted" => Self::Converted,
            _ => Self::Other,
        }
    }
}

/// Lead view model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Treatment (dental) or service (plumbing) the lead asked about
    pub service: String,
    pub budget: String,
    pub source: String,
    pub notes: String,
    pub status: LeadStatus,
    pub date: String,
    pub time: String,
}

/// Manual lead entry from the dashboard form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "treatment")]
    pub service: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Lead counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total: usize,
    pub new: usize,
    pub contacted: usize,
    pub qualified: usize,
    pub converted: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSummaryResponse {
    pub leads: Vec<Lead>,
    pub stats: LeadStats,
}
