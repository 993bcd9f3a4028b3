//! Google Sheets values client

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::services::google_auth::{GoogleAuth, SHEETS_READONLY_SCOPE};
use crate::services::upstream_client;
use crate::types::SheetRecord;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Source of raw sheet rows, header row first
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_rows(&self, range: &str) -> ApiResult<Vec<Vec<Value>>>;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct SheetsClient {
    sheet_id: String,
    auth: Arc<GoogleAuth>,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(sheet_id: impl Into<String>, auth: Arc<GoogleAuth>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            auth,
            client: upstream_client(),
        }
    }
}

#[async_trait]
impl SheetSource for SheetsClient {
    async fn fetch_rows(&self, range: &str) -> ApiResult<Vec<Vec<Value>>> {
        let token = self.auth.access_token(SHEETS_READONLY_SCOPE).await?;
        let url = format!(
            "{}/{}/values/{}",
            SHEETS_API_BASE,
            self.sheet_id,
            urlencoding::encode(range)
        );
        debug!("Fetching sheet range {}", range);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream {
                service: "Google Sheets",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Header-keyed records from raw rows. The header row is consumed; short
/// rows pad with `""`; each record gets a 1-based `id` that overrides any
/// `id` column.
pub fn rows_to_records(rows: &[Vec<Value>]) -> Vec<SheetRecord> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(cell_text).collect();

    data.iter()
        .enumerate()
        .map(|(i, row)| {
            let mut record: SheetRecord = headers
                .iter()
                .enumerate()
                .map(|(j, h)| {
                    let cell = row.get(j).map(cell_text).unwrap_or_default();
                    (h.clone(), Value::String(cell))
                })
                .collect();
            record.insert("id".to_string(), Value::from(i as i64 + 1));
            record
        })
        .collect()
}
