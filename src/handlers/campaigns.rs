//! Ad campaign endpoints

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::AppState;
use crate::error::ApiResult;
use crate::services::aggregator;
use crate::services::normalizer::campaign::campaign_from_payload;
use crate::types::CampaignReportResponse;

async fn raw_campaigns(state: &AppState) -> ApiResult<Vec<Value>> {
    let campaigns = state.campaigns()?.campaigns().await?;
    info!("Fetched {} campaigns from Meta", campaigns.len());
    Ok(campaigns)
}

/// GET /api/meta/campaigns
pub async fn meta_campaigns(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    debug!("Proxying Meta campaigns");
    Ok(Json(json!({ "data": raw_campaigns(&state).await? })))
}

/// GET /api/campaigns
pub async fn campaign_report(State(state): State<AppState>) -> ApiResult<Json<CampaignReportResponse>> {
    debug!("Building campaign report");
    let campaigns = raw_campaigns(&state).await?.iter().map(campaign_from_payload).collect();
    Ok(Json(aggregator::campaign_report(campaigns)))
}
