//! Follow-up endpoints

use axum::extract::State;
use axum::Json;
use tracing::{debug, info};

use super::AppState;
use crate::error::ApiResult;
use crate::services::aggregator::followup_stats;
use crate::services::normalizer::followup::followup_from_record;
use crate::services::sheets::rows_to_records;
use crate::types::{FollowUpSummaryResponse, SheetRecord};

async fn followup_records(state: &AppState) -> ApiResult<Vec<SheetRecord>> {
    let rows = state.sheets()?.fetch_rows(&state.followups_range).await?;
    let records = rows_to_records(&rows);
    info!("Fetched {} follow-ups from sheet", records.len());
    Ok(records)
}

/// GET /api/followups
pub async fn list_followups(State(state): State<AppState>) -> ApiResult<Json<Vec<SheetRecord>>> {
    debug!("Listing raw follow-ups");
    Ok(Json(followup_records(&state).await?))
}

/// GET /api/followups/summary
pub async fn followup_summary(State(state): State<AppState>) -> ApiResult<Json<FollowUpSummaryResponse>> {
    debug!("Building follow-up summary");
    let ctx = state.ctx();
    let follow_ups: Vec<_> = followup_records(&state)
        .await?
        .iter()
        .enumerate()
        .map(|(i, r)| followup_from_record(r, i, &ctx))
        .collect();
    let stats = followup_stats(&follow_ups);
    Ok(Json(FollowUpSummaryResponse { follow_ups, stats }))
}
