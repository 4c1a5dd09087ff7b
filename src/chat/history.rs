use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::models::{ChatMessage, Role};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Answer the user's questions concisely and in a friendly way. Markdown is supported.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl From<Sender> for Role {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Role::User,
            Sender::Ai => Role::Assistant,
        }
    }
}

/// One turn of the visible conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.sender.into(),
            content: self.content.clone(),
        }
    }
}

/// Issues message ids from the millisecond clock, bumping past the last id
/// when two messages land in the same millisecond.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues after ids already present in `messages`.
    pub fn after(messages: &[Message]) -> Self {
        let last = messages
            .iter()
            .filter_map(|m| m.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let candidate = now.timestamp_millis();
        self.last = if candidate > self.last { candidate } else { self.last + 1 };
        self.last.to_string()
    }

    pub fn message(&mut self, sender: Sender, content: impl Into<String>) -> Message {
        let timestamp = Utc::now();
        Message {
            id: self.next_id(timestamp),
            content: content.into(),
            sender,
            timestamp,
        }
    }
}

/// Outbound request list: the system prompt, the last `limit` stored turns
/// (oldest first), then the new user content.
pub fn build_outbound(history: &[Message], content: &str, system_prompt: &str, limit: usize) -> Vec<ChatMessage> {
    let start = history.len().saturating_sub(limit);
    let recent = &history[start..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(recent.iter().map(Message::to_chat_message));
    messages.push(ChatMessage::user(content));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ids_increase_within_the_same_millisecond() {
        let mut ids = IdGenerator::new();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let a: i64 = ids.next_id(now).parse().unwrap();
        let b: i64 = ids.next_id(now).parse().unwrap();
        let c: i64 = ids.next_id(now).parse().unwrap();

        assert_eq!(a, 1_700_000_000_000);
        assert_eq!(b, a + 1);
        assert_eq!(c, a + 2);
    }

    #[test]
    fn ids_continue_after_seeded_history() {
        let seeded = vec![Message {
            id: "9999999999999".to_string(),
            content: "hi".to_string(),
            sender: Sender::Ai,
            timestamp: Utc::now(),
        }];
        let mut ids = IdGenerator::after(&seeded);
        let next: i64 = ids.next_id(Utc.timestamp_millis_opt(1).unwrap()).parse().unwrap();
        assert_eq!(next, 10_000_000_000_000);
    }
}
