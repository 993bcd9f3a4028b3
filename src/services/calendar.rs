//! Google Calendar events client

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::services::google_auth::{GoogleAuth, CALENDAR_READONLY_SCOPE};
use crate::services::upstream_client;
use crate::types::CalendarEvent;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Source of upcoming calendar events, soonest first
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn upcoming_events(&self) -> ApiResult<Vec<CalendarEvent>>;
}

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<GoogleEventRaw>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventRaw {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
}

/// Timed events carry `dateTime`; all-day events only `date`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

impl EventDateTime {
    fn value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

pub fn event_from_raw(raw: GoogleEventRaw) -> CalendarEvent {
    let when = |t: &Option<EventDateTime>| {
        t.as_ref()
            .and_then(EventDateTime::value)
            .unwrap_or_default()
            .to_string()
    };

    CalendarEvent {
        start: when(&raw.start),
        end: when(&raw.end),
        summary: raw
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Busy".to_string()),
        description: raw.description.unwrap_or_default(),
        location: raw.location.unwrap_or_default(),
        status: raw
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "confirmed".to_string()),
        html_link: raw.html_link.unwrap_or_default(),
        id: raw.id,
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct CalendarClient {
    calendar_id: String,
    max_results: u32,
    auth: Arc<GoogleAuth>,
    client: reqwest::Client,
}

impl CalendarClient {
    pub fn new(calendar_id: impl Into<String>, max_results: u32, auth: Arc<GoogleAuth>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            max_results,
            auth,
            client: upstream_client(),
        }
    }
}

#[async_trait]
impl EventSource for CalendarClient {
    async fn upcoming_events(&self) -> ApiResult<Vec<CalendarEvent>> {
        let token = self.auth.access_token(CALENDAR_READONLY_SCOPE).await?;
        let url = format!(
            "{}/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(&self.calendar_id)
        );
        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = self.max_results.to_string();
        debug!("Fetching up to {} events from calendar {}", self.max_results, self.calendar_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream {
                service: "Google Calendar",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let list: EventListResponse = response.json().await?;
        Ok(list.items.into_iter().map(event_from_raw).collect())
    }
}
