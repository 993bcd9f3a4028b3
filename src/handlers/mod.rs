//! HTTP handlers and router

pub mod appointments;
pub mod calls;
pub mod campaigns;
pub mod dashboard;
pub mod followups;
pub mod health;
pub mod leads;
pub mod messages;
pub mod patients;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use chrono::{FixedOffset, Utc};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, Vertical};
use crate::defaults::DEFAULT_META_API_VERSION;
use crate::error::{ApiError, ApiResult};
use crate::services::calendar::{CalendarClient, EventSource};
use crate::services::google_auth::GoogleAuth;
use crate::services::messaging::{
    InstagramSender, LogMessageSender, MessageLog, MessageSender, WhatsAppSender,
};
use crate::services::meta_ads::{CampaignSource, MetaAdsClient};
use crate::services::normalizer::NormalizeContext;
use crate::services::sheets::{SheetSource, SheetsClient};
use crate::services::vapi::{CallSource, VapiClient};
use crate::types::Platform;

/// Shared handler state. Upstreams are `None` when their credentials are
/// missing; the matching endpoints then answer `NotConfigured`.
#[derive(Clone)]
pub struct AppState {
    pub vertical: Vertical,
    pub display_offset: FixedOffset,
    pub leads_range: String,
    pub followups_range: String,
    pub sheets: Option<Arc<dyn SheetSource>>,
    pub events: Option<Arc<dyn EventSource>>,
    pub calls: Option<Arc<dyn CallSource>>,
    pub campaigns: Option<Arc<dyn CampaignSource>>,
    pub whatsapp: Arc<dyn MessageSender>,
    pub instagram: Arc<dyn MessageSender>,
    pub messages: Arc<MessageLog>,
}

impl AppState {
    /// Build every upstream client the configuration has credentials for
    pub fn from_config(config: &Config) -> Result<Self> {
        let google = match &config.google_credentials {
            Some(source) => Some(Arc::new(
                GoogleAuth::from_source(source).context("Failed to load Google service account")?,
            )),
            None => None,
        };
        if let Some(auth) = &google {
            info!("Google service account: {}", auth.client_email());
        }

        let sheets = match (&config.sheet_id, &google) {
            (Some(id), Some(auth)) => {
                Some(Arc::new(SheetsClient::new(id.clone(), Arc::clone(auth))) as Arc<dyn SheetSource>)
            }
            _ => None,
        };
        let events = google.as_ref().map(|auth| {
            Arc::new(CalendarClient::new(
                config.calendar_id.clone(),
                config.calendar_max_results,
                Arc::clone(auth),
            )) as Arc<dyn EventSource>
        });
        let calls = config
            .vapi
            .clone()
            .map(|vapi| Arc::new(VapiClient::new(vapi)) as Arc<dyn CallSource>);
        let campaigns = config
            .meta
            .clone()
            .map(|meta| Arc::new(MetaAdsClient::new(meta)) as Arc<dyn CampaignSource>);

        let graph_version = config
            .meta
            .as_ref()
            .map(|m| m.api_version.clone())
            .unwrap_or_else(|| DEFAULT_META_API_VERSION.to_string());
        let whatsapp: Arc<dyn MessageSender> = match config.whatsapp.clone() {
            Some(creds) => Arc::new(WhatsAppSender::new(creds, graph_version.clone())),
            None => Arc::new(LogMessageSender::new(Platform::Whatsapp)),
        };
        let instagram: Arc<dyn MessageSender> = match config.instagram.clone() {
            Some(creds) => Arc::new(InstagramSender::new(creds, graph_version)),
            None => Arc::new(LogMessageSender::new(Platform::Instagram)),
        };

        Ok(Self {
            vertical: config.vertical,
            display_offset: config.display_offset,
            leads_range: config.leads_range.clone(),
            followups_range: config.followups_range.clone(),
            sheets,
            events,
            calls,
            campaigns,
            whatsapp,
            instagram,
            messages: Arc::new(MessageLog::new()),
        })
    }

    pub fn ctx(&self) -> NormalizeContext {
        NormalizeContext::new(self.vertical, self.display_offset, Utc::now())
    }

    pub fn sheets(&self) -> ApiResult<&Arc<dyn SheetSource>> {
        self.sheets
            .as_ref()
            .ok_or(ApiError::NotConfigured("Missing SHEET_ID or Google credentials"))
    }

    pub fn events(&self) -> ApiResult<&Arc<dyn EventSource>> {
        self.events
            .as_ref()
            .ok_or(ApiError::NotConfigured("Missing Google credentials"))
    }

    pub fn calls(&self) -> ApiResult<&Arc<dyn CallSource>> {
        self.calls
            .as_ref()
            .ok_or(ApiError::NotConfigured("Missing VAPI_API_KEY"))
    }

    pub fn campaigns(&self) -> ApiResult<&Arc<dyn CampaignSource>> {
        self.campaigns
            .as_ref()
            .ok_or(ApiError::NotConfigured("Missing Meta access token or ad account ID"))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/api/leads/summary", get(leads::lead_summary))
        .route("/api/followups", get(followups::list_followups))
        .route("/api/followups/summary", get(followups::followup_summary))
        .route("/api/appointments", get(appointments::list_appointments))
        .route("/api/appointments/calendar", get(appointments::calendar))
        .route("/api/vapi/calls", get(calls::list_vapi_calls))
        .route("/api/vapi/calls/:id", get(calls::get_vapi_call))
        .route("/api/vapi/initiate-call", post(calls::initiate_call))
        .route("/api/initiate-call", post(calls::initiate_call))
        .route("/api/calls", get(calls::list_calls))
        .route("/api/patients", get(patients::list_patients).post(patients::create_patient))
        .route("/api/meta/campaigns", get(campaigns::meta_campaigns))
        .route("/api/campaigns", get(campaigns::campaign_report))
        .route("/api/dashboard", get(dashboard::dashboard))
        .route("/api/messages", get(messages::list_messages).post(messages::record_message))
        .route("/api/inbox", get(messages::inbox))
        .route("/api/whatsapp/send", post(messages::send_whatsapp))
        .route("/api/instagram/send", post(messages::send_instagram))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
