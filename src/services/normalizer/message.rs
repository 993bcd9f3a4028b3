//! Flat message log → inbox conversations

use std::collections::HashMap;

use super::{format_time, NormalizeContext};
use crate::types::{Conversation, ConversationMessage, Direction, InboxMessage, Platform, Sender};

/// Group messages by (platform, counterpart). Messages inside a conversation
/// are oldest first; conversations are ordered by their latest message,
/// newest first.
pub fn conversations_from_messages(messages: &[InboxMessage], ctx: &NormalizeContext) -> Vec<Conversation> {
    let mut groups: HashMap<(Platform, &str), Vec<&InboxMessage>> = HashMap::new();
    for msg in messages {
        groups
            .entry((msg.platform, msg.counterpart()))
            .or_default()
            .push(msg);
    }

    let mut threads: Vec<(Vec<&InboxMessage>, Platform, &str)> = groups
        .into_iter()
        .map(|((platform, participant), mut msgs)| {
            msgs.sort_by_key(|m| m.timestamp);
            (msgs, platform, participant)
        })
        .collect();

    threads.sort_by(|(a, _, pa), (b, _, pb)| {
        let latest_a = a.last().map(|m| m.timestamp);
        let latest_b = b.last().map(|m| m.timestamp);
        latest_b.cmp(&latest_a).then_with(|| pa.cmp(pb))
    });

    threads
        .into_iter()
        .filter_map(|(msgs, platform, participant)| {
            let last = *msgs.last()?;
            Some(Conversation {
                id: format!("{}:{}", platform.as_str(), participant),
                platform,
                participant: participant.to_string(),
                last_message: last.text.clone(),
                time: format_time(&ctx.local(last.timestamp)),
                messages: msgs
                    .iter()
                    .map(|m| ConversationMessage {
                        id: m.id,
                        sender: match m.direction {
                            Direction::Inbound => Sender::User,
                            Direction::Outbound => Sender::Assistant,
                        },
                        text: m.text.clone(),
                        time: format_time(&ctx.local(m.timestamp)),
                    })
                    .collect(),
            })
        })
        .collect()
}
