//! Configuration management

use std::path::PathBuf;

use anyhow::{self, Context, Result};
use chrono::{FixedOffset, Local, Offset};

use crate::defaults::*;

/// Business branding; decides which fallbacks the normalizers use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vertical {
    #[default]
    Dental,
    Plumbing,
}

impl Vertical {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dental" | "clinic" => Some(Self::Dental),
            "plumbing" | "plumber" => Some(Self::Plumbing),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dental => "dental",
            Self::Plumbing => "plumbing",
        }
    }

    /// Display name when an appointment or call carries no name
    pub fn unknown_person(&self) -> &'static str {
        match self {
            Self::Dental => "Unknown Patient",
            Self::Plumbing => "Unknown Customer",
        }
    }

    /// Service shown when the source record names none
    pub fn default_service(&self) -> &'static str {
        match self {
            Self::Dental => "Consultation",
            Self::Plumbing => "General",
        }
    }
}

/// Where the Google service-account key comes from
#[derive(Debug, Clone)]
pub enum GoogleCredentialsSource {
    File(PathBuf),
    /// Base64-encoded JSON key, for hosts without a writable filesystem
    Base64(String),
}

#[derive(Debug, Clone)]
pub struct VapiConfig {
    pub api_key: String,
    pub assistant_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct MetaConfig {
    pub access_token: String,
    pub ad_account_id: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct PlatformCredentials {
    pub token: String,
    /// WhatsApp phone number id or Instagram business account id
    pub sender_id: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,

    pub vertical: Vertical,

    /// Offset used for all displayed dates and calendar bucketing
    pub display_offset: FixedOffset,

    /// Spreadsheet holding the lead form responses
    pub sheet_id: Option<String>,
    pub leads_range: String,
    pub followups_range: String,

    pub google_credentials: Option<GoogleCredentialsSource>,
    pub calendar_id: String,
    pub calendar_max_results: u32,

    pub vapi: Option<VapiConfig>,
    pub meta: Option<MetaConfig>,
    pub whatsapp: Option<PlatformCredentials>,
    pub instagram: Option<PlatformCredentials>,

    pub inbox_poll_secs: u64,
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let port = match env_opt("PORT") {
            Some(p) => p.parse().context("PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        let vertical = match env_opt("BUSINESS_VERTICAL") {
            Some(v) => Vertical::parse(&v)
                .with_context(|| format!("BUSINESS_VERTICAL must be 'dental' or 'plumbing', got '{}'", v))?,
            None => Vertical::default(),
        };

        let display_offset = match env_opt("DISPLAY_UTC_OFFSET_MINUTES") {
            Some(m) => {
                let minutes: i32 = m
                    .parse()
                    .context("DISPLAY_UTC_OFFSET_MINUTES must be an integer")?;
                FixedOffset::east_opt(minutes * 60)
                    .context("DISPLAY_UTC_OFFSET_MINUTES out of range")?
            }
            None => Local::now().offset().fix(),
        };

        let google_credentials = match (
            env_opt("GOOGLE_APPLICATION_CREDENTIALS"),
            env_opt("GOOGLE_CREDENTIALS_BASE64"),
        ) {
            (Some(path), _) => Some(GoogleCredentialsSource::File(PathBuf::from(path))),
            (None, Some(b64)) => Some(GoogleCredentialsSource::Base64(b64)),
            (None, None) => None,
        };

        let calendar_max_results = match env_opt("CALENDAR_MAX_RESULTS") {
            Some(n) => n.parse().context("CALENDAR_MAX_RESULTS must be a number")?,
            None => DEFAULT_CALENDAR_MAX_RESULTS,
        };

        let vapi = env_opt("VAPI_API_KEY").map(|api_key| VapiConfig {
            api_key,
            assistant_id: env_opt("VAPI_ASSISTANT_ID"),
            // VAPI_PHONE_NUMBER is the older name of the same setting
            phone_number_id: env_opt("VAPI_PHONE_NUMBER_ID").or_else(|| env_opt("VAPI_PHONE_NUMBER")),
            base_url: env_opt("VAPI_BASE_URL").unwrap_or_else(|| "https://api.vapi.ai".to_string()),
        });

        let meta = match (env_opt("META_ACCESS_TOKEN"), env_opt("META_AD_ACCOUNT_ID")) {
            (Some(access_token), Some(ad_account_id)) => Some(MetaConfig {
                access_token,
                ad_account_id,
                api_version: env_opt("META_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_META_API_VERSION.to_string()),
            }),
            (Some(_), None) => {
                tracing::warn!("META_ACCESS_TOKEN set without META_AD_ACCOUNT_ID, ad analytics disabled");
                None
            }
            _ => None,
        };

        let whatsapp = match (env_opt("WHATSAPP_TOKEN"), env_opt("WHATSAPP_PHONE_NUMBER_ID")) {
            (Some(token), Some(sender_id)) => Some(PlatformCredentials { token, sender_id }),
            _ => None,
        };

        let instagram = match (env_opt("INSTAGRAM_TOKEN"), env_opt("INSTAGRAM_ACCOUNT_ID")) {
            (Some(token), Some(sender_id)) => Some(PlatformCredentials { token, sender_id }),
            _ => None,
        };

        let inbox_poll_secs = match env_opt("INBOX_POLL_SECS") {
            Some(s) => s.parse().context("INBOX_POLL_SECS must be a number")?,
            None => DEFAULT_INBOX_POLL_SECS,
        };
        if inbox_poll_secs == 0 {
            anyhow::bail!("INBOX_POLL_SECS must be at least 1");
        }

        Ok(Self {
            port,
            vertical,
            display_offset,
            sheet_id: env_opt("SHEET_ID"),
            leads_range: env_opt("LEADS_RANGE").unwrap_or_else(|| DEFAULT_LEADS_RANGE.to_string()),
            followups_range: env_opt("FOLLOWUPS_RANGE")
                .unwrap_or_else(|| DEFAULT_FOLLOWUPS_RANGE.to_string()),
            google_credentials,
            calendar_id: env_opt("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            calendar_max_results,
            vapi,
            meta,
            whatsapp,
            instagram,
            inbox_poll_secs,
        })
    }

    /// Configuration with every upstream disabled
    #[cfg(test)]
    pub fn unconfigured() -> Self {
        Self {
            port: DEFAULT_PORT,
            vertical: Vertical::default(),
            display_offset: FixedOffset::east_opt(0).expect("zero offset is valid"),
            sheet_id: None,
            leads_range: DEFAULT_LEADS_RANGE.to_string(),
            followups_range: DEFAULT_FOLLOWUPS_RANGE.to_string(),
            google_credentials: None,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            calendar_max_results: DEFAULT_CALENDAR_MAX_RESULTS,
            vapi: None,
            meta: None,
            whatsapp: None,
            instagram: None,
            inbox_poll_secs: DEFAULT_INBOX_POLL_SECS,
        }
    }

    /// One line per upstream, for startup logs and `check-config`
    pub fn describe_upstreams(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("google sheets", self.sheet_id.is_some() && self.google_credentials.is_some()),
            ("google calendar", self.google_credentials.is_some()),
            ("vapi", self.vapi.is_some()),
            ("meta ads", self.meta.is_some()),
            ("whatsapp", self.whatsapp.is_some()),
            ("instagram", self.instagram.is_some()),
        ]
    }
}
