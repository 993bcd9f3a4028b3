//! Health check

use axum::Json;
use tracing::debug;

use crate::types::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    debug!("Health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "API server is running".to_string(),
    })
}
