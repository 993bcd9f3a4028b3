//! Outbound messaging and the in-memory message log.
//!
//! `MessageSender` is the transport seam: `WhatsAppSender` and
//! `InstagramSender` talk to the Graph API, `LogMessageSender` only logs
//! (used when a platform has no credentials), `FakeMessageSender` records
//! sends for tests. The trait is object-safe so `AppState` can hold
//! `Arc<dyn MessageSender>`.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use parking_lot::Mutex;
use parking_lot::RwLock;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::PlatformCredentials;
use crate::defaults::MESSAGE_LOG_CAPACITY;
use crate::error::{ApiError, ApiResult};
use crate::services::upstream_client;
use crate::types::{Direction, InboundMessageRequest, InboxMessage, Platform};

const GRAPH_API_BASE: &str = "https://graph.facebook.com";

// =============================================================================
// Core trait
// =============================================================================

#[async_trait]
pub trait MessageSender: Send + Sync {
    fn platform(&self) -> Platform;

    /// Business-side identity used as `from` on outbound log entries
    fn sender_id(&self) -> &str;

    async fn send(&self, to: &str, text: &str) -> ApiResult<()>;
}

// =============================================================================
// LogMessageSender
// =============================================================================

pub struct LogMessageSender {
    platform: Platform,
}

impl LogMessageSender {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl MessageSender for LogMessageSender {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn sender_id(&self) -> &str {
        "business"
    }

    async fn send(&self, to: &str, text: &str) -> ApiResult<()> {
        info!(
            platform = self.platform.as_str(),
            to = %to,
            "[LogMessageSender] Would send message: {}",
            text
        );
        Ok(())
    }
}

// =============================================================================
// FakeMessageSender
// =============================================================================

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub to: String,
    pub text: String,
}

#[cfg(test)]
pub struct FakeMessageSender {
    platform: Platform,
    pub sent: Mutex<Vec<SentMessage>>,
}

#[cfg(test)]
impl FakeMessageSender {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl MessageSender for FakeMessageSender {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn sender_id(&self) -> &str {
        "fake-business"
    }

    async fn send(&self, to: &str, text: &str) -> ApiResult<()> {
        self.sent.lock().push(SentMessage {
            to: to.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// Graph API senders
// =============================================================================

async fn post_graph(
    client: &reqwest::Client,
    service: &'static str,
    url: String,
    token: &str,
    body: serde_json::Value,
) -> ApiResult<()> {
    let response = client.post(url).bearer_auth(token).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Upstream {
            service,
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    Ok(())
}

/// WhatsApp Cloud API text messages
pub struct WhatsAppSender {
    credentials: PlatformCredentials,
    api_version: String,
    client: reqwest::Client,
}

impl WhatsAppSender {
    pub fn new(credentials: PlatformCredentials, api_version: impl Into<String>) -> Self {
        Self {
            credentials,
            api_version: api_version.into(),
            client: upstream_client(),
        }
    }
}

#[async_trait]
impl MessageSender for WhatsAppSender {
    fn platform(&self) -> Platform {
        Platform::Whatsapp
    }

    fn sender_id(&self) -> &str {
        &self.credentials.sender_id
    }

    async fn send(&self, to: &str, text: &str) -> ApiResult<()> {
        let url = format!(
            "{}/{}/{}/messages",
            GRAPH_API_BASE, self.api_version, self.credentials.sender_id
        );
        let body = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": {"body": text},
        });
        post_graph(&self.client, "WhatsApp", url, &self.credentials.token, body).await?;
        info!(to = %to, "WhatsApp message sent");
        Ok(())
    }
}

/// Instagram messaging (Send API on the business account)
pub struct InstagramSender {
    credentials: PlatformCredentials,
    api_version: String,
    client: reqwest::Client,
}

impl InstagramSender {
    pub fn new(credentials: PlatformCredentials, api_version: impl Into<String>) -> Self {
        Self {
            credentials,
            api_version: api_version.into(),
            client: upstream_client(),
        }
    }
}

#[async_trait]
impl MessageSender for InstagramSender {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn sender_id(&self) -> &str {
        &self.credentials.sender_id
    }

    async fn send(&self, to: &str, text: &str) -> ApiResult<()> {
        let url = format!(
            "{}/{}/{}/messages",
            GRAPH_API_BASE, self.api_version, self.credentials.sender_id
        );
        let body = json!({
            "recipient": {"id": to},
            "message": {"text": text},
        });
        post_graph(&self.client, "Instagram", url, &self.credentials.token, body).await?;
        info!(to = %to, "Instagram message sent");
        Ok(())
    }
}

// =============================================================================
// Message log
// =============================================================================

/// Process-local log of inbound and outbound messages. Lost on restart.
/// Holds at most `capacity` entries; the oldest recorded entry is evicted
/// first.
pub struct MessageLog {
    messages: RwLock<VecDeque<InboxMessage>>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(MESSAGE_LOG_CAPACITY)
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn push(&self, msg: InboxMessage) -> InboxMessage {
        let mut messages = self.messages.write();
        while messages.len() >= self.capacity {
            messages.pop_front();
        }
        messages.push_back(msg.clone());
        msg
    }

    pub fn record_inbound(&self, req: InboundMessageRequest, now: DateTime<Utc>) -> InboxMessage {
        self.push(InboxMessage {
            id: Uuid::new_v4(),
            platform: req.platform,
            from: req.from,
            to: req.to.unwrap_or_else(|| "business".to_string()),
            direction: Direction::Inbound,
            text: req.text,
            timestamp: req.timestamp.unwrap_or(now),
        })
    }

    pub fn record_outbound(
        &self,
        platform: Platform,
        from: &str,
        to: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> InboxMessage {
        self.push(InboxMessage {
            id: Uuid::new_v4(),
            platform,
            from: from.to_string(),
            to: to.to_string(),
            direction: Direction::Outbound,
            text: text.to_string(),
            timestamp: now,
        })
    }

    /// All messages, oldest first
    pub fn all(&self) -> Vec<InboxMessage> {
        let mut messages: Vec<_> = self.messages.read().iter().cloned().collect();
        messages.sort_by_key(|m| m.timestamp);
        messages
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn fake_sender_captures_messages() {
        let sender = FakeMessageSender::new(Platform::Whatsapp);
        sender.send("+1555", "Your appointment is confirmed").await.unwrap();

        let sent = sender.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "+1555");
        assert_eq!(sender.platform(), Platform::Whatsapp);
    }

    #[test]
    fn log_sender_does_not_error() {
        let sender = LogMessageSender::new(Platform::Instagram);
        tokio_test::assert_ok!(tokio_test::block_on(sender.send("ann.lee", "Hi")));
    }

    #[test]
    fn log_keeps_direction_and_sorts() {
        let log = MessageLog::new();
        let now = Utc::now();

        log.record_outbound(Platform::Whatsapp, "biz", "+1555", "Reply", now);
        let inbound = log.record_inbound(
            InboundMessageRequest {
                platform: Platform::Whatsapp,
                from: "+1555".into(),
                to: None,
                text: "Question".into(),
                timestamp: Some(now - Duration::minutes(1)),
            },
            now,
        );

        assert_eq!(inbound.to, "business");
        assert_eq!(inbound.counterpart(), "+1555");

        let all = log.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "Question");
        assert_eq!(all[1].direction, Direction::Outbound);
        assert_eq!(all[1].counterpart(), "+1555");
    }

    #[test]
    fn empty_log() {
        assert!(MessageLog::new().is_empty());
    }

    #[test]
    fn log_evicts_oldest_beyond_capacity() {
        let log = MessageLog::with_capacity(3);
        let now = Utc::now();
        for i in 0..5 {
            log.record_outbound(Platform::Whatsapp, "biz", "+1555", &format!("m{}", i), now + Duration::seconds(i));
        }

        assert_eq!(log.len(), 3);
        let texts: Vec<_> = log.all().into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
    }
}
