//! Universal inbox endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::{debug, info};

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::services::messaging::MessageSender;
use crate::services::normalizer::message::conversations_from_messages;
use crate::types::{Conversation, InboundMessageRequest, InboxMessage, SendMessageRequest};

/// GET /api/messages
pub async fn list_messages(State(state): State<AppState>) -> Json<Vec<InboxMessage>> {
    debug!("Listing message log");
    if state.messages.is_empty() {
        debug!("Message log is empty");
    }
    Json(state.messages.all())
}

/// POST /api/messages (webhook relay)
pub async fn record_message(
    State(state): State<AppState>,
    Json(request): Json<InboundMessageRequest>,
) -> ApiResult<Json<InboxMessage>> {
    if request.from.trim().is_empty() || request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Both 'from' and 'text' are required".to_string()));
    }
    let message = state.messages.record_inbound(request, Utc::now());
    info!(
        "Inbound {} message from {} ({} in log)",
        message.platform.as_str(),
        message.from,
        state.messages.len()
    );
    Ok(Json(message))
}

/// GET /api/inbox
pub async fn inbox(State(state): State<AppState>) -> Json<Vec<Conversation>> {
    debug!("Building inbox");
    Json(conversations_from_messages(&state.messages.all(), &state.ctx()))
}

async fn send_via(
    state: &AppState,
    sender: &Arc<dyn MessageSender>,
    request: SendMessageRequest,
) -> ApiResult<Json<InboxMessage>> {
    let to = request.to.trim();
    if to.is_empty() || request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Both 'to' and 'text' are required".to_string()));
    }

    sender.send(to, &request.text).await?;
    let message = state
        .messages
        .record_outbound(sender.platform(), sender.sender_id(), to, &request.text, Utc::now());
    Ok(Json(message))
}

/// POST /api/whatsapp/send
pub async fn send_whatsapp(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Json<InboxMessage>> {
    debug!("WhatsApp send to {}", request.to);
    send_via(&state, &state.whatsapp, request).await
}

/// POST /api/instagram/send
pub async fn send_instagram(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Json<InboxMessage>> {
    debug!("Instagram send to {}", request.to);
    send_via(&state, &state.instagram, request).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::*;
    use crate::services::messaging::FakeMessageSender;
    use crate::types::Platform;

    #[tokio::test]
    async fn inbound_then_reply_forms_one_conversation() {
        let whatsapp = Arc::new(FakeMessageSender::new(Platform::Whatsapp));
        let mut state = unconfigured_state();
        state.whatsapp = whatsapp.clone();

        let (status, _) = send(
            state.clone(),
            "POST",
            "/api/messages",
            Some(json!({"platform": "whatsapp", "from": "+1555", "text": "Do you open Saturday?",
                        "timestamp": "2020-01-06T09:00:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            state.clone(),
            "POST",
            "/api/whatsapp/send",
            Some(json!({"to": "+1555", "text": "Yes, 9 to 1."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["direction"], "outbound");
        assert_eq!(body["from"], "fake-business");
        assert_eq!(whatsapp.sent_messages().len(), 1);

        let (_, inbox) = get_json(state.clone(), "/api/inbox").await;
        assert_eq!(inbox.as_array().unwrap().len(), 1);
        assert_eq!(inbox[0]["id"], "whatsapp:+1555");
        assert_eq!(inbox[0]["messages"][0]["sender"], "user");
        assert_eq!(inbox[0]["messages"][1]["sender"], "assistant");
        assert_eq!(inbox[0]["lastMessage"], "Yes, 9 to 1.");

        let (_, log) = get_json(state, "/api/messages").await;
        assert_eq!(log.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unconfigured_instagram_logs_and_records() {
        let (status, body) = send(
            unconfigured_state(),
            "POST",
            "/api/instagram/send",
            Some(json!({"to": "ann.lee", "text": "Hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["platform"], "instagram");
        assert_eq!(body["from"], "business");
    }

    #[tokio::test]
    async fn send_requires_recipient() {
        let (status, _) = send(
            unconfigured_state(),
            "POST",
            "/api/whatsapp/send",
            Some(json!({"to": "", "text": "Hi"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
