//! Request-level error type and its HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::services::google_auth::GoogleAuthError;
use crate::types::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{service} returned {status}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server misconfiguration: {0}")]
    NotConfigured(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("Google auth: {0}")]
    Auth(#[from] GoogleAuthError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Http(_) => StatusCode::BAD_GATEWAY,
            Self::NotConfigured(_) | Self::Auth(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> String {
        match self {
            Self::Upstream { service, .. } => format!("{} Error", service),
            Self::Http(_) => "Upstream unreachable".to_string(),
            Self::NotConfigured(_) => "Server misconfiguration".to_string(),
            Self::BadRequest(_) => "Bad request".to_string(),
            Self::Auth(_) => "Authentication failed".to_string(),
            Self::Internal(_) => "Internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!("Request failed ({}): {}", status, self);

        let mut body = ErrorResponse::new(self.code(), self.to_string());
        if let Self::Upstream { body: details, .. } = &self {
            body = body.with_details(details.clone());
        }

        (status, Json(body)).into_response()
    }
}
