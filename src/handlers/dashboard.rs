//! Dashboard overview

use axum::extract::State;
use axum::Json;
use tracing::debug;

use super::appointments::{normalize_events, upcoming_events};
use super::calls::normalized_calls;
use super::leads::lead_records;
use super::AppState;
use crate::defaults::DASHBOARD_CALL_LIMIT;
use crate::error::ApiResult;
use crate::services::aggregator::dashboard_summary;
use crate::types::DashboardResponse;

/// GET /api/dashboard
///
/// Upstreams are read one after another (calls, leads, appointments) and
/// any failure fails the whole request.
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardResponse>> {
    debug!("Building dashboard");
    let ctx = state.ctx();

    let calls = normalized_calls(&state, DASHBOARD_CALL_LIMIT).await?;
    let lead_count = lead_records(&state).await?.len();
    let appointments = normalize_events(&upcoming_events(&state).await?, &ctx);

    Ok(Json(dashboard_summary(&calls, lead_count, &appointments, ctx.now)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::{Duration, SecondsFormat, Utc};
    use serde_json::json;

    use super::super::test_support::*;
    use crate::services::fakes::{FakeCalls, FakeEvents, FakeSheets};
    use crate::types::CalendarEvent;

    fn configured() -> super::AppState {
        let minutes_ago = |m: i64| (Utc::now() - Duration::minutes(m)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut state = unconfigured_state();
        state.calls = Some(Arc::new(FakeCalls {
            calls: vec![
                json!({"status": "ended", "endedReason": "assistant-ended-call", "createdAt": minutes_ago(5),
                       "customer": {"name": "Ann"}}),
                json!({"status": "in-progress", "createdAt": minutes_ago(120)}),
            ],
            ..Default::default()
        }));
        let rows = serde_json::from_value(json!([["Name"], ["A"], ["B"], ["C"]])).unwrap();
        state.sheets = Some(Arc::new(FakeSheets {
            ranges: vec![(state.leads_range.clone(), rows)],
        }));
        state.events = Some(Arc::new(FakeEvents {
            events: (0..5)
                .map(|i| CalendarEvent {
                    id: format!("e{}", i),
                    summary: format!("Cleaning - Patient {}", i),
                    ..Default::default()
                })
                .collect(),
        }));
        state
    }

    #[tokio::test]
    async fn dashboard_combines_upstreams() {
        let (status, body) = get_json(configured(), "/api/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"], json!({"appointments": 5, "leads": 3, "calls": 2, "conversionRate": 50}));
        assert_eq!(body["recentCalls"][0]["name"], "Ann");
        assert_eq!(body["recentCalls"][0]["outcome"], "Completed");
        assert_eq!(body["recentCalls"][0]["time"], "5m ago");
        assert_eq!(body["recentCalls"][1]["outcome"], "In Progress");
        assert_eq!(body["recentCalls"][1]["time"], "2h ago");
        assert_eq!(body["recentAppointments"].as_array().unwrap().len(), 3);
        assert_eq!(body["recentAppointments"][2]["customer"], "Patient 2");
    }

    #[tokio::test]
    async fn one_failing_upstream_fails_the_request() {
        let mut state = configured();
        state.sheets = None;
        let (status, body) = get_json(state, "/api/dashboard").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Server misconfiguration");
    }
}
