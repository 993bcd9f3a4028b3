//! Voice-agent call endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::Value;
use tracing::{debug, info};

use super::AppState;
use crate::error::ApiResult;
use crate::services::aggregator::call_stats;
use crate::services::normalizer::call::call_from_payload;
use crate::services::vapi::required_phone;
use crate::types::{Call, CallListQuery, CallListResponse, InitiateCallRequest};

pub(crate) async fn raw_calls(state: &AppState, limit: u32) -> ApiResult<Vec<Value>> {
    let calls = state.calls()?.list_calls(limit).await?;
    info!("Fetched {} calls from Vapi", calls.len());
    Ok(calls)
}

pub(crate) async fn normalized_calls(state: &AppState, limit: u32) -> ApiResult<Vec<Call>> {
    let ctx = state.ctx();
    Ok(raw_calls(state, limit)
        .await?
        .iter()
        .enumerate()
        .map(|(i, c)| call_from_payload(c, i, &ctx))
        .collect())
}

/// GET /api/vapi/calls?limit=N
pub async fn list_vapi_calls(
    State(state): State<AppState>,
    Query(query): Query<CallListQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    debug!("Proxying Vapi call list (limit={})", query.limit);
    Ok(Json(raw_calls(&state, query.limit).await?))
}

/// GET /api/vapi/calls/:id
pub async fn get_vapi_call(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    debug!("Proxying Vapi call {}", id);
    Ok(Json(state.calls()?.get_call(&id).await?))
}

/// POST /api/vapi/initiate-call
pub async fn initiate_call(
    State(state): State<AppState>,
    Json(request): Json<InitiateCallRequest>,
) -> ApiResult<Json<Value>> {
    debug!("Initiate call request");
    // A missing number is the caller's fault even when Vapi is not configured
    required_phone(&request)?;
    let response = state.calls()?.initiate_call(&request).await?;
    let id = response.get("id").and_then(Value::as_str).unwrap_or("?");
    info!("Call initiated: {}", id);
    Ok(Json(response))
}

/// GET /api/calls?limit=N
pub async fn list_calls(
    State(state): State<AppState>,
    Query(query): Query<CallListQuery>,
) -> ApiResult<Json<CallListResponse>> {
    debug!("Listing normalized calls (limit={})", query.limit);
    let calls = normalized_calls(&state, query.limit).await?;
    let stats = call_stats(&calls);
    Ok(Json(CallListResponse { calls, stats }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::*;
    use crate::services::fakes::FakeCalls;

    fn fake_calls() -> FakeCalls {
        FakeCalls {
            calls: vec![
                json!({
                    "id": "c1",
                    "status": "ended",
                    "endedReason": "assistant-ended-call",
                    "customer": {"number": "+1555", "name": "Ann"},
                    "createdAt": "2026-10-17T09:00:00Z",
                    "startedAt": "2026-10-17T09:00:00Z",
                    "endedAt": "2026-10-17T09:01:30Z"
                }),
                json!({"id": "c2", "status": "in-progress"}),
            ],
            ..Default::default()
        }
    }

    fn state_with(calls: FakeCalls) -> (super::AppState, Arc<FakeCalls>) {
        let calls = Arc::new(calls);
        let mut state = unconfigured_state();
        state.calls = Some(calls.clone());
        (state, calls)
    }

    #[tokio::test]
    async fn proxy_returns_raw_payloads() {
        let (state, _) = state_with(fake_calls());
        let (status, body) = get_json(state, "/api/vapi/calls?limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["endedReason"], "assistant-ended-call");
    }

    #[tokio::test]
    async fn single_call_proxy() {
        let (state, _) = state_with(fake_calls());
        let (status, body) = get_json(state.clone(), "/api/vapi/calls/c2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "in-progress");

        let (status, body) = get_json(state, "/api/vapi/calls/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Vapi Error");
    }

    #[tokio::test]
    async fn normalized_calls_with_stats() {
        let (state, _) = state_with(fake_calls());
        let (status, body) = get_json(state, "/api/calls").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["calls"][0]["duration"], "1:30");
        assert_eq!(body["calls"][0]["outcome"], "Completed");
        assert_eq!(body["calls"][1]["outcome"], "Unknown");
        assert_eq!(
            body["stats"],
            json!({"totalCalls": 2, "completedCalls": 1, "activeCalls": 1, "successRate": 50, "avgDuration": "0:45"})
        );
    }

    #[tokio::test]
    async fn initiate_call_builds_payload() {
        let (state, fake) = state_with(FakeCalls::default());
        let (status, body) = send(
            state,
            "POST",
            "/api/vapi/initiate-call",
            Some(json!({"phoneNumber": "+15550100", "procedure_interest": "Implants"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "call_new");
        let sent = fake.initiated.lock().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["customer"]["name"], "Test User");
        assert_eq!(sent[0]["assistantOverrides"]["variableValues"]["procedure_interest"], "Implants");
    }

    #[tokio::test]
    async fn initiate_call_alias_route() {
        let (state, fake) = state_with(FakeCalls::default());
        let (status, _) = send(state, "POST", "/api/initiate-call", Some(json!({"phoneNumber": "+1"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fake.initiated.lock().len(), 1);
    }

    #[tokio::test]
    async fn missing_phone_is_400_even_unconfigured() {
        let (status, body) =
            send(unconfigured_state(), "POST", "/api/vapi/initiate-call", Some(json!({"name": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Phone number is required");
    }

    #[tokio::test]
    async fn upstream_rejection_passes_status_and_details() {
        let (state, _) = state_with(FakeCalls {
            fail_status: Some(401),
            ..Default::default()
        });
        let (status, body) =
            send(state, "POST", "/api/vapi/initiate-call", Some(json!({"phoneNumber": "+1"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Vapi Error");
        assert_eq!(body["details"], r#"{"message":"rejected"}"#);
    }
}
