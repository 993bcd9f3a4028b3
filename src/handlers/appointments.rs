//! Appointment endpoints

use axum::extract::{Query, State};
use axum::Json;
use tracing::{debug, info};

use super::AppState;
use crate::error::ApiResult;
use crate::services::calendar_grid::build_calendar;
use crate::services::normalizer::appointment::appointment_from_event;
use crate::services::normalizer::NormalizeContext;
use crate::types::{Appointment, CalendarEvent, CalendarQuery, CalendarResponse};

pub(crate) async fn upcoming_events(state: &AppState) -> ApiResult<Vec<CalendarEvent>> {
    let events = state.events()?.upcoming_events().await?;
    info!("Fetched {} upcoming events", events.len());
    Ok(events)
}

pub(crate) fn normalize_events(events: &[CalendarEvent], ctx: &NormalizeContext) -> Vec<Appointment> {
    events.iter().map(|e| appointment_from_event(e, ctx)).collect()
}

/// GET /api/appointments
pub async fn list_appointments(State(state): State<AppState>) -> ApiResult<Json<Vec<CalendarEvent>>> {
    debug!("Listing upcoming appointments");
    Ok(Json(upcoming_events(&state).await?))
}

/// GET /api/appointments/calendar?view=&date=&shift=
pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> ApiResult<Json<CalendarResponse>> {
    debug!("Calendar {:?} view at {:?} shifted {}", query.view, query.date, query.shift);
    let ctx = state.ctx();
    let appointments = normalize_events(&upcoming_events(&state).await?, &ctx);
    let today = ctx.today();
    let cursor = query.date.unwrap_or(today);
    Ok(Json(build_calendar(&appointments, query.view, cursor, query.shift, today)?))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use super::super::test_support::*;
    use crate::services::fakes::FakeEvents;
    use crate::types::CalendarEvent;

    fn event(id: &str, summary: &str, start: &str, end: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            summary: summary.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            status: "confirmed".to_string(),
            ..Default::default()
        }
    }

    fn state() -> super::AppState {
        let mut state = unconfigured_state();
        state.events = Some(Arc::new(FakeEvents {
            events: vec![
                event("a", "Cleaning - John Doe", "2026-10-20T09:30:00Z", "2026-10-20T10:00:00Z"),
                event("b", "Root canal: Priya", "2026-10-20T14:00:00Z", "2026-10-20T15:30:00Z"),
                event("c", "Checkup - Ann", "2026-11-02T08:00:00Z", "2026-11-02T08:30:00Z"),
            ],
        }));
        state
    }

    #[tokio::test]
    async fn raw_events_pass_through() {
        let (status, body) = get_json(state(), "/api/appointments").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0]["summary"], "Cleaning - John Doe");
        assert_eq!(body[0]["htmlLink"], "");
    }

    #[tokio::test]
    async fn month_view_buckets_by_day() {
        let (status, body) =
            get_json(state(), "/api/appointments/calendar?view=month&date=2026-10-05").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "October 2026");
        assert_eq!(body["grid"]["leadingBlanks"], 4);
        assert_eq!(body["days"].as_array().unwrap().len(), 31);
        let day_20 = &body["days"][19]["appointments"];
        assert_eq!(day_20.as_array().unwrap().len(), 2);
        assert_eq!(day_20[0]["customer"], "John Doe");
        assert_eq!(day_20[1]["service"], "Root canal");
        assert_eq!(day_20[1]["duration"], "90 min");
    }

    #[tokio::test]
    async fn shift_moves_cursor() {
        let (_, body) =
            get_json(state(), "/api/appointments/calendar?view=month&date=2026-10-31&shift=1").await;
        assert_eq!(body["cursor"], "2026-11-30");
        assert_eq!(body["days"][1]["appointments"][0]["customer"], "Ann");
    }

    #[tokio::test]
    async fn day_view_has_hour_rows() {
        let (_, body) = get_json(state(), "/api/appointments/calendar?view=day&date=2026-10-20").await;
        let hours = body["hours"].as_array().unwrap();
        assert_eq!(hours.len(), 13);
        assert_eq!(hours[1]["label"], "9 AM");
        assert_eq!(hours[1]["appointments"][0]["id"], "a");
        assert_eq!(hours[6]["appointments"][0]["id"], "b");
    }

    #[tokio::test]
    async fn week_past_last_date_is_bad_request() {
        let (status, body) =
            get_json(state(), "/api/appointments/calendar?view=week&date=%2B262142-12-31").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad request");
    }
}
