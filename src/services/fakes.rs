//! In-memory upstreams for handler tests

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::services::calendar::EventSource;
use crate::services::meta_ads::CampaignSource;
use crate::services::sheets::SheetSource;
use crate::services::vapi::{build_call_payload, required_phone, CallSource};
use crate::types::{CalendarEvent, InitiateCallRequest};

/// Rows per range; unknown ranges are empty sheets
#[derive(Default)]
pub struct FakeSheets {
    pub ranges: Vec<(String, Vec<Vec<Value>>)>,
}

#[async_trait]
impl SheetSource for FakeSheets {
    async fn fetch_rows(&self, range: &str) -> ApiResult<Vec<Vec<Value>>> {
        Ok(self
            .ranges
            .iter()
            .find(|(r, _)| r == range)
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeEvents {
    pub events: Vec<CalendarEvent>,
}

#[async_trait]
impl EventSource for FakeEvents {
    async fn upcoming_events(&self) -> ApiResult<Vec<CalendarEvent>> {
        Ok(self.events.clone())
    }
}

/// Serves `calls`; records initiated-call payloads. With `fail_status`
/// every call answers like a rejecting upstream.
#[derive(Default)]
pub struct FakeCalls {
    pub calls: Vec<Value>,
    pub fail_status: Option<u16>,
    pub initiated: Mutex<Vec<Value>>,
}

impl FakeCalls {
    fn check(&self) -> ApiResult<()> {
        match self.fail_status {
            Some(status) => Err(ApiError::Upstream {
                service: "Vapi",
                status,
                body: r#"{"message":"rejected"}"#.to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CallSource for FakeCalls {
    async fn list_calls(&self, limit: u32) -> ApiResult<Vec<Value>> {
        self.check()?;
        Ok(self.calls.iter().take(limit as usize).cloned().collect())
    }

    async fn get_call(&self, id: &str) -> ApiResult<Value> {
        self.check()?;
        self.calls
            .iter()
            .find(|c| c.get("id").and_then(Value::as_str) == Some(id))
            .cloned()
            .ok_or(ApiError::Upstream {
                service: "Vapi",
                status: 404,
                body: "Not Found".to_string(),
            })
    }

    async fn initiate_call(&self, request: &InitiateCallRequest) -> ApiResult<Value> {
        let phone = required_phone(request)?;
        self.check()?;
        let payload = build_call_payload("fake-assistant", "fake-number", phone, request);
        self.initiated.lock().push(payload.clone());
        Ok(serde_json::json!({"id": "call_new", "status": "queued", "customer": payload["customer"]}))
    }
}

#[derive(Default)]
pub struct FakeCampaigns {
    pub campaigns: Vec<Value>,
}

#[async_trait]
impl CampaignSource for FakeCampaigns {
    async fn campaigns(&self) -> ApiResult<Vec<Value>> {
        Ok(self.campaigns.clone())
    }
}
