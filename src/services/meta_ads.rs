//! Meta (Facebook) Ads campaigns client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::MetaConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::upstream_client;

const GRAPH_API_BASE: &str = "https://graph.facebook.com";
const CAMPAIGN_FIELDS: &str = "id,name,status,effective_status,objective,\
insights{spend,impressions,clicks,ctr,cpc,cpm,reach,actions}";

/// Source of campaign payloads with their insights attached
#[async_trait]
pub trait CampaignSource: Send + Sync {
    async fn campaigns(&self) -> ApiResult<Vec<Value>>;
}

#[derive(Debug, Deserialize)]
struct CampaignPage {
    #[serde(default)]
    data: Vec<Value>,
}

/// Replace the Graph API `insights: {data: [row]}` edge by `row` itself.
/// Campaigns without insights keep no `insights` key.
pub fn flatten_insights(mut campaign: Value) -> Value {
    let row = campaign
        .get("insights")
        .and_then(|i| i.get("data"))
        .and_then(Value::as_array)
        .map(|rows| rows.first().cloned());

    if let (Some(row), Some(obj)) = (row, campaign.as_object_mut()) {
        match row {
            Some(row) => {
                obj.insert("insights".to_string(), row);
            }
            None => {
                obj.remove("insights");
            }
        }
    }
    campaign
}

pub struct MetaAdsClient {
    config: MetaConfig,
    client: reqwest::Client,
}

impl MetaAdsClient {
    pub fn new(config: MetaConfig) -> Self {
        Self {
            config,
            client: upstream_client(),
        }
    }

    fn account_path(&self) -> String {
        let id = self.config.ad_account_id.trim_start_matches("act_");
        format!("{}/{}/act_{}/campaigns", GRAPH_API_BASE, self.config.api_version, id)
    }
}

#[async_trait]
impl CampaignSource for MetaAdsClient {
    async fn campaigns(&self) -> ApiResult<Vec<Value>> {
        debug!("Fetching Meta campaigns for account {}", self.config.ad_account_id);
        let response = self
            .client
            .get(self.account_path())
            .query(&[
                ("fields", CAMPAIGN_FIELDS),
                ("access_token", self.config.access_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream {
                service: "Meta",
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let page: CampaignPage = response.json().await?;
        Ok(page.data.into_iter().map(flatten_insights).collect())
    }
}
