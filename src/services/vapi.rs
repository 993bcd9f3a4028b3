//! Vapi voice-agent client: call listing, single call, outbound calls

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::VapiConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::upstream_client;
use crate::types::InitiateCallRequest;

const DEFAULT_CUSTOMER_NAME: &str = "Test User";

/// Source of raw call payloads plus outbound dialing
#[async_trait]
pub trait CallSource: Send + Sync {
    /// Most recent calls first
    async fn list_calls(&self, limit: u32) -> ApiResult<Vec<Value>>;
    async fn get_call(&self, id: &str) -> ApiResult<Value>;
    async fn initiate_call(&self, request: &InitiateCallRequest) -> ApiResult<Value>;
}

/// Body for `POST /call/phone`. `variables` wins over `procedure_interest`.
pub fn build_call_payload(
    assistant_id: &str,
    phone_number_id: &str,
    phone_number: &str,
    request: &InitiateCallRequest,
) -> Value {
    let variable_values = match &request.variables {
        Some(vars) => Value::Object(vars.clone()),
        None => {
            let mut vars = Map::new();
            vars.insert(
                "procedure_interest".to_string(),
                request
                    .procedure_interest
                    .clone()
                    .map(Value::String)
                    .unwrap_or(Value::Null),
            );
            Value::Object(vars)
        }
    };

    json!({
        "assistantId": assistant_id,
        "phoneNumberId": phone_number_id,
        "customer": {
            "number": phone_number,
            "name": request
                .name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(DEFAULT_CUSTOMER_NAME),
        },
        "assistantOverrides": {
            "variableValues": variable_values,
        },
    })
}

/// Phone number from the request, required and non-blank
pub fn required_phone(request: &InitiateCallRequest) -> ApiResult<&str> {
    request
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Phone number is required".to_string()))
}

pub struct VapiClient {
    config: VapiConfig,
    client: reqwest::Client,
}

impl VapiClient {
    pub fn new(config: VapiConfig) -> Self {
        Self {
            config,
            client: upstream_client(),
        }
    }

    async fn read_json(response: reqwest::Response) -> ApiResult<Value> {
        let status = response.status();
        // Vapi answers 201 for created calls
        if status.as_u16() != 200 && status.as_u16() != 201 {
            return Err(ApiError::Upstream {
                service: "Vapi",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CallSource for VapiClient {
    async fn list_calls(&self, limit: u32) -> ApiResult<Vec<Value>> {
        debug!("Fetching calls from Vapi (limit={})", limit);
        let response = self
            .client
            .get(format!("{}/call", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .query(&[("limit", limit)])
            .send()
            .await?;

        match Self::read_json(response).await? {
            Value::Array(calls) => Ok(calls),
            _ => Ok(Vec::new()),
        }
    }

    async fn get_call(&self, id: &str) -> ApiResult<Value> {
        debug!("Fetching Vapi call {}", id);
        let response = self
            .client
            .get(format!("{}/call/{}", self.config.base_url, urlencoding::encode(id)))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn initiate_call(&self, request: &InitiateCallRequest) -> ApiResult<Value> {
        let phone = required_phone(request)?;
        let assistant_id = self
            .config
            .assistant_id
            .as_deref()
            .ok_or(ApiError::NotConfigured("Missing VAPI_ASSISTANT_ID"))?;
        let phone_number_id = self
            .config
            .phone_number_id
            .as_deref()
            .ok_or(ApiError::NotConfigured("Missing VAPI_PHONE_NUMBER_ID"))?;

        let payload = build_call_payload(assistant_id, phone_number_id, phone, request);
        info!("Initiating call to {}", phone);

        let response = self
            .client
            .post(format!("{}/call/phone", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        Self::read_json(response).await
    }
}
