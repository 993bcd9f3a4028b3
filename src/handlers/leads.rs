//! Lead endpoints

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::{debug, info};

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::aggregator::lead_stats;
use crate::services::normalizer::lead::{lead_from_form, lead_from_record};
use crate::services::sheets::rows_to_records;
use crate::types::{CreateLeadRequest, Lead, LeadSummaryResponse, SheetRecord};

/// Header-keyed rows of the configured leads range
pub(crate) async fn lead_records(state: &AppState) -> ApiResult<Vec<SheetRecord>> {
    let rows = state.sheets()?.fetch_rows(&state.leads_range).await?;
    let records = rows_to_records(&rows);
    info!("Fetched {} leads from sheet", records.len());
    Ok(records)
}

pub(crate) async fn normalized_leads(state: &AppState) -> ApiResult<Vec<Lead>> {
    let ctx = state.ctx();
    Ok(lead_records(state)
        .await?
        .iter()
        .enumerate()
        .map(|(i, r)| lead_from_record(r, i, &ctx))
        .collect())
}

/// GET /api/leads
pub async fn list_leads(State(state): State<AppState>) -> ApiResult<Json<Vec<SheetRecord>>> {
    debug!("Listing raw leads");
    Ok(Json(lead_records(&state).await?))
}

/// GET /api/leads/summary
pub async fn lead_summary(State(state): State<AppState>) -> ApiResult<Json<LeadSummaryResponse>> {
    debug!("Building lead summary");
    let leads = normalized_leads(&state).await?;
    let stats = lead_stats(&leads);
    Ok(Json(LeadSummaryResponse { leads, stats }))
}

/// POST /api/leads
pub async fn create_lead(
    State(state): State<AppState>,
    Json(form): Json<CreateLeadRequest>,
) -> ApiResult<Json<Lead>> {
    debug!("Manual lead entry");
    if form.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    let lead = lead_from_form(&form, Utc::now(), &state.ctx());
    info!("Created manual lead {}", lead.id);
    Ok(Json(lead))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::*;
    use crate::services::fakes::FakeSheets;

    fn state_with_leads() -> super::AppState {
        let mut state = unconfigured_state();
        let rows = serde_json::from_value(json!([
            ["Timestamp", "Full Name", "Phone Number", "Treatment", "Status"],
            ["10/17/2026 14:03:22", "Maria Lopez", "+1 555 0100", "Implants", "new"],
            ["10/16/2026 09:00:00", "Tom Reed", "+1 555 0101", "", "converted"],
            ["10/15/2026 09:00:00", "Ann Lee"]
        ]))
        .unwrap();
        state.sheets = Some(Arc::new(FakeSheets {
            ranges: vec![(state.leads_range.clone(), rows)],
        }));
        state
    }

    #[tokio::test]
    async fn raw_leads_keep_headers_and_add_ids() {
        let (status, body) = get_json(state_with_leads(), "/api/leads").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0]["Full Name"], "Maria Lopez");
        assert_eq!(body[2]["Phone Number"], "");
        assert_eq!(body[2]["id"], 3);

        let keys: Vec<&str> = body[0].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Timestamp", "Full Name", "Phone Number", "Treatment", "Status", "id"]);
    }

    #[tokio::test]
    async fn summary_counts_statuses() {
        let (status, body) = get_json(state_with_leads(), "/api/leads/summary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"], json!({"total": 3, "new": 2, "contacted": 0, "qualified": 0, "converted": 1}));
        assert_eq!(body["leads"][0]["service"], "Implants");
        assert_eq!(body["leads"][1]["service"], "Consultation");
        assert_eq!(body["leads"][2]["phone"], "N/A");
    }

    #[tokio::test]
    async fn empty_sheet_is_empty_list() {
        let mut state = unconfigured_state();
        state.sheets = Some(Arc::new(FakeSheets::default()));
        let (status, body) = get_json(state, "/api/leads").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn manual_lead_entry() {
        let (status, body) = send(
            unconfigured_state(),
            "POST",
            "/api/leads",
            Some(json!({"name": "Sam Hill", "phone": "555-0102", "treatment": "Whitening"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "new");
        assert_eq!(body["service"], "Whitening");
        assert_eq!(body["source"], "Manual Entry");
        assert!(body["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn manual_lead_requires_name() {
        let (status, body) =
            send(unconfigured_state(), "POST", "/api/leads", Some(json!({"name": " "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Name is required");
    }
}
