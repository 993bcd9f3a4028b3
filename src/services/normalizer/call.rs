//! Voice platform call payloads → `Call`

use chrono::{FixedOffset, Utc};
use serde_json::Value;

use super::{float, format_date, format_minutes_seconds, format_time, parse_timestamp, text, NormalizeContext, NOT_AVAILABLE};
use crate::defaults::TRANSCRIPT_PREVIEW_CHARS;
use crate::types::{Call, CallMessage, CallOutcome};

pub fn outcome_for(ended_reason: Option<&str>, status: Option<&str>) -> CallOutcome {
    match ended_reason {
        Some("assistant-ended-call") => CallOutcome::Completed,
        Some("customer-ended-call") => CallOutcome::CustomerEnded,
        Some("assistant-error") => CallOutcome::Error,
        _ if status == Some("ended") => CallOutcome::Ended,
        _ => CallOutcome::Unknown,
    }
}

fn messages_of(call: &Value) -> Vec<CallMessage> {
    let Some(items) = call.get("messages").and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|m| {
            let content = text(m, &["message"]).or_else(|| text(m, &["content"]))?;
            Some(CallMessage {
                role: text(m, &["role"]).unwrap_or("unknown").to_string(),
                content: content.to_string(),
                time: float(m, &["secondsFromStart"]),
            })
        })
        .collect()
}

fn preview(transcript: &str) -> String {
    if transcript.chars().count() > TRANSCRIPT_PREVIEW_CHARS {
        let head: String = transcript.chars().take(TRANSCRIPT_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        transcript.to_string()
    }
}

/// Milliseconds between `startedAt` and `endedAt`, when both parse
pub fn call_duration_ms(call: &Value) -> Option<i64> {
    let utc = FixedOffset::east_opt(0)?;
    let started = parse_timestamp(text(call, &["startedAt"])?, &utc)?;
    let ended = parse_timestamp(text(call, &["endedAt"])?, &utc)?;
    Some((ended - started).num_milliseconds())
}

pub fn call_from_payload(call: &Value, index: usize, ctx: &NormalizeContext) -> Call {
    let created_at = text(call, &["createdAt"])
        .and_then(|s| parse_timestamp(s, &ctx.offset));

    let duration_ms = call_duration_ms(call);
    let status = text(call, &["status"]).map(str::to_string);
    let ended_reason = text(call, &["endedReason"]).map(str::to_string);

    let messages = messages_of(call);
    let full_transcript = match text(call, &["transcript"]) {
        Some(t) => t.to_string(),
        None if !messages.is_empty() => messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        None => "No transcript available".to_string(),
    };

    Call {
        id: text(call, &["id"])
            .map(str::to_string)
            .unwrap_or_else(|| format!("call-{}", index + 1)),
        name: text(call, &["customer", "name"]).unwrap_or("Unknown").to_string(),
        phone: text(call, &["customer", "number"]).unwrap_or(NOT_AVAILABLE).to_string(),
        email: text(call, &["customer", "email"]).map(str::to_string),
        date: created_at.as_ref().map(format_date).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        time: created_at.as_ref().map(format_time).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        duration: duration_ms
            .map(format_minutes_seconds)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        duration_ms,
        outcome: outcome_for(ended_reason.as_deref(), status.as_deref()),
        language: text(call, &["assistant", "voice", "language"])
            .unwrap_or("English")
            .to_string(),
        transcript: preview(&full_transcript),
        full_transcript,
        messages,
        summary: text(call, &["analysis", "summary"])
            .or_else(|| text(call, &["summary"]))
            .unwrap_or("No summary available")
            .to_string(),
        status,
        ended_reason,
        recording_url: text(call, &["recordingUrl"])
            .or_else(|| text(call, &["artifact", "recordingUrl"]))
            .map(str::to_string),
        cost: float(call, &["cost"]),
        assistant_id: text(call, &["assistantId"]).map(str::to_string),
        created_at: created_at.map(|dt| dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "id": "call_123",
            "customer": {"name": "Sarah Miller", "number": "+15550100"},
            "createdAt": "2026-10-17T09:00:00Z",
            "startedAt": "2026-10-17T09:00:05.000Z",
            "endedAt": "2026-10-17T09:02:12.500Z",
            "endedReason": "assistant-ended-call",
            "status": "ended",
            "messages": [
                {"role": "system", "message": "You are a receptionist"},
                {"role": "bot", "message": "Hello!", "secondsFromStart": 0.5},
                {"role": "user", "message": "Hi, I need a cleaning", "secondsFromStart": 2.1},
                {"role": "tool_calls"}
            ],
            "analysis": {"summary": "Booked a cleaning"},
            "assistant": {"voice": {"language": "Spanish"}},
            "recordingUrl": "https://rec.example/1.wav",
            "cost": 0.42,
            "assistantId": "asst_1"
        })
    }

    #[test]
    fn test_full_payload() {
        let call = call_from_payload(&payload(), 0, &ctx());

        assert_eq!(call.id, "call_123");
        assert_eq!(call.name, "Sarah Miller");
        assert_eq!(call.phone, "+15550100");
        assert_eq!(call.date, "10/17/2026");
        assert_eq!(call.time, "09:00 AM");
        assert_eq!(call.duration, "2:07");
        assert_eq!(call.duration_ms, Some(127_500));
        assert_eq!(call.outcome, CallOutcome::Completed);
        assert_eq!(call.language, "Spanish");
        assert_eq!(call.summary, "Booked a cleaning");
        assert_eq!(call.messages.len(), 3);
        assert_eq!(call.messages[1].time, Some(0.5));
        assert_eq!(call.cost, Some(0.42));
        assert_eq!(call.recording_url.as_deref(), Some("https://rec.example/1.wav"));
    }

    #[test]
    fn test_transcript_falls_back_to_messages() {
        let call = call_from_payload(&payload(), 0, &ctx());
        assert_eq!(
            call.full_transcript,
            "You are a receptionist Hello! Hi, I need a cleaning"
        );
    }

    #[test]
    fn test_empty_payload_defaults() {
        let call = call_from_payload(&json!({}), 4, &ctx());

        assert_eq!(call.id, "call-5");
        assert_eq!(call.name, "Unknown");
        assert_eq!(call.phone, "N/A");
        assert_eq!(call.duration, "N/A");
        assert_eq!(call.outcome, CallOutcome::Unknown);
        assert_eq!(call.language, "English");
        assert_eq!(call.full_transcript, "No transcript available");
        assert_eq!(call.summary, "No summary available");
        assert!(call.created_at.is_none());
    }

    #[test]
    fn test_long_transcript_is_truncated() {
        let long = "a".repeat(250);
        let call = call_from_payload(&json!({"transcript": long}), 0, &ctx());
        assert_eq!(call.transcript.len(), 203);
        assert!(call.transcript.ends_with("..."));
        assert_eq!(call.full_transcript.len(), 250);
    }

    #[test]
    fn test_outcome_rules() {
        assert_eq!(outcome_for(Some("customer-ended-call"), Some("ended")), CallOutcome::CustomerEnded);
        assert_eq!(outcome_for(Some("assistant-error"), None), CallOutcome::Error);
        assert_eq!(outcome_for(Some("silence-timed-out"), Some("ended")), CallOutcome::Ended);
        assert_eq!(outcome_for(None, Some("in-progress")), CallOutcome::Unknown);
    }

    #[test]
    fn test_duration_formula() {
        // 3 min 9.999 s floors to 3:09
        let call = json!({
            "startedAt": "2026-01-01T00:00:00Z",
            "endedAt": "2026-01-01T00:03:09.999Z"
        });
        assert_eq!(call_duration_ms(&call), Some(189_999));
        assert_eq!(format_minutes_seconds(189_999), "3:09");
    }
}
