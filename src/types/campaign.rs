//! Ad campaign types

use serde::{Deserialize, Serialize};

/// Campaign view model with flattened insights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: String,
    pub spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub reach: i64,
    pub leads: i64,
    pub conversions: i64,
}

/// Totals and averaged rates over a campaign list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub total_spend: f64,
    pub total_impressions: i64,
    pub total_clicks: i64,
    pub total_leads: i64,
    pub total_reach: i64,
    /// Percentage with two decimals, e.g. `"1.25"`
    #[serde(rename = "avgCTR")]
    pub avg_ctr: String,
    #[serde(rename = "avgCPC")]
    pub avg_cpc: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignReportResponse {
    pub campaigns: Vec<Campaign>,
    pub stats: CampaignStats,
    pub best_ctr: Option<Campaign>,
    pub most_leads: Option<Campaign>,
    pub lowest_cpc: Option<Campaign>,
}
