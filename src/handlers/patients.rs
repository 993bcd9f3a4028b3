//! Patient endpoints. Patients are derived from call history; manual
//! entries are echoed back and not stored.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use tracing::{debug, info};

use super::calls::normalized_calls;
use super::AppState;
use crate::defaults::PATIENT_CALL_LIMIT;
use crate::error::{ApiError, ApiResult};
use crate::services::aggregator::{filter_patients, group_patients, patient_from_form, patient_stats};
use crate::types::{CreatePatientRequest, Patient, PatientListResponse, PatientQuery};

/// GET /api/patients?search=
pub async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientQuery>,
) -> ApiResult<Json<PatientListResponse>> {
    debug!("Listing patients (search={:?})", query.search);
    let ctx = state.ctx();
    let calls = normalized_calls(&state, PATIENT_CALL_LIMIT).await?;
    let patients = group_patients(&calls, &ctx);
    // Stats describe the whole list, not the filtered view
    let stats = patient_stats(&patients, ctx.now);
    let patients = match query.search.as_deref() {
        Some(term) => filter_patients(patients, term),
        None => patients,
    };
    info!("Derived {} patients from {} calls", stats.total, calls.len());
    Ok(Json(PatientListResponse { patients, stats }))
}

/// POST /api/patients
pub async fn create_patient(Json(form): Json<CreatePatientRequest>) -> ApiResult<Json<Patient>> {
    debug!("Manual patient entry");
    if form.name.trim().is_empty() || form.phone.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and phone are required".to_string()));
    }
    Ok(Json(patient_from_form(&form, Utc::now())))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::{Duration, SecondsFormat, Utc};
    use serde_json::json;

    use super::super::test_support::*;
    use crate::services::fakes::FakeCalls;

    fn state() -> super::AppState {
        let ago = |days: i64| (Utc::now() - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut state = unconfigured_state();
        state.calls = Some(Arc::new(FakeCalls {
            calls: vec![
                json!({"id": "1", "status": "ended", "customer": {"number": "+1555", "name": "Ann Lee"}, "createdAt": ago(1)}),
                json!({"id": "2", "status": "ended", "customer": {"number": "+1777", "name": "Bob Stone"}, "createdAt": ago(20)}),
                json!({"id": "3", "status": "ended", "customer": {"number": "+1555", "name": "Ann Lee"}, "createdAt": ago(3)}),
            ],
            ..Default::default()
        }));
        state
    }

    #[tokio::test]
    async fn patients_grouped_with_stats() {
        let (status, body) = get_json(state(), "/api/patients").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patients"].as_array().unwrap().len(), 2);
        assert_eq!(body["patients"][0]["name"], "Ann Lee");
        assert_eq!(body["patients"][0]["totalCalls"], 2);
        assert_eq!(body["stats"], json!({"total": 2, "activeThisWeek": 1, "newThisMonth": 2}));
    }

    #[tokio::test]
    async fn search_filters_by_name_or_phone() {
        let (_, body) = get_json(state(), "/api/patients?search=bob").await;
        assert_eq!(body["patients"].as_array().unwrap().len(), 1);
        assert_eq!(body["stats"]["total"], 2);

        let (_, body) = get_json(state(), "/api/patients?search=1555").await;
        assert_eq!(body["patients"][0]["phone"], "+1555");
    }

    #[tokio::test]
    async fn manual_patient_is_echoed() {
        let (status, body) = send(
            unconfigured_state(),
            "POST",
            "/api/patients",
            Some(json!({"name": "Cara", "phone": "555", "insurance": "Delta"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["manualEntry"], true);
        assert_eq!(body["status"], "Active");
        assert_eq!(body["email"], "N/A");
        assert_eq!(body["insurance"], "Delta");
    }
}
