//! Google service-account authentication
//!
//! Signs an RS256 JWT with the service account's private key and trades it
//! for an access token (OAuth 2.0 JWT bearer grant). Tokens are cached per
//! scope and refreshed shortly before they expire.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use base64::Engine;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::GoogleCredentialsSource;
use crate::services::{upstream_client, upstream_client_with_timeout};

pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("Credentials not found at {0}")]
    CredentialsNotFound(PathBuf),
    #[error("Invalid credentials format: {0}")]
    InvalidCredentials(String),
    #[error("JWT signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token exchange failed ({status}): {body}")]
    Exchange { status: u16, body: String },
}

/// The fields of a service-account JSON key this crate needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

pub struct GoogleAuth {
    key: ServiceAccountKey,
    client: reqwest::Client,
    tokens: Mutex<HashMap<String, CachedToken>>,
}

impl GoogleAuth {
    pub fn from_key(key: ServiceAccountKey) -> Self {
        Self {
            key,
            client: upstream_client(),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the token-exchange request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = upstream_client_with_timeout(timeout);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, GoogleAuthError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| GoogleAuthError::InvalidCredentials(e.to_string()))?;
        Ok(Self::from_key(key))
    }

    pub fn from_source(source: &GoogleCredentialsSource) -> Result<Self, GoogleAuthError> {
        let json = match source {
            GoogleCredentialsSource::File(path) => std::fs::read_to_string(path)
                .map_err(|_| GoogleAuthError::CredentialsNotFound(path.clone()))?,
            GoogleCredentialsSource::Base64(encoded) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| GoogleAuthError::InvalidCredentials(format!("base64: {}", e)))?;
                String::from_utf8(bytes)
                    .map_err(|e| GoogleAuthError::InvalidCredentials(format!("utf-8: {}", e)))?
            }
        };
        Self::from_json(&json)
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Signed JWT asserting this service account for `scope`
    fn assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, GoogleAuthError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    async fn cached(&self, scope: &str) -> Option<String> {
        let tokens = self.tokens.lock().await;
        let cached = tokens.get(scope)?;
        if Instant::now() < cached.refresh_at {
            return Some(cached.value.clone());
        }
        debug!("Google token for {} is about to expire, refreshing", scope);
        None
    }

    /// Bearer token for `scope`, from cache when still fresh. The cache is
    /// not locked during the exchange, so a slow token endpoint never
    /// blocks callers holding a fresh token for another scope.
    pub async fn access_token(&self, scope: &str) -> Result<String, GoogleAuthError> {
        if let Some(token) = self.cached(scope).await {
            return Ok(token);
        }

        let assertion = self.assertion(scope, Utc::now())?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::Exchange {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        info!("Obtained Google access token for {} ({}s)", self.key.client_email, token.expires_in);

        self.tokens.lock().await.insert(
            scope.to_string(),
            CachedToken {
                value: token.access_token.clone(),
                refresh_at: Instant::now() + lifetime,
            },
        );
        Ok(token.access_token)
    }
}
