use chrono::{DateTime, Utc};
use std::fmt;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use uuid::Uuid;

/// Topic a conversation was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    #[default]
    General,
    Code,
    Explanation,
    Creative,
    Analysis,
}

impl Category {
    pub fn icon(self) -> &'static str {
        match self {
            Category::General => "💬",
            Category::Code => "💻",
            Category::Explanation => "📚",
            Category::Creative => "🎨",
            Category::Analysis => "🔍",
        }
    }

    /// Name given to a conversation created from this category without an explicit one.
    pub fn default_name(self) -> &'static str {
        match self {
            Category::General => "General Chat",
            Category::Code => "Code Generation",
            Category::Explanation => "Explanations",
            Category::Creative => "Creative Writing",
            Category::Analysis => "Analysis",
        }
    }

    /// Next category in declaration order, wrapping around.
    pub fn next(self) -> Category {
        let all: Vec<Category> = Category::iter().collect();
        let index = all.iter().position(|c| *c == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }
}

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn avatar(self) -> &'static str {
        match self {
            Role::User => "👤",
            Role::Assistant => "🤖",
        }
    }
}

/// Last known reachability of the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Unknown => "⚪ Checking...",
            HealthStatus::Healthy => "🟢 Online",
            HealthStatus::Unhealthy => "🔴 Offline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConversationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Issues conversation ids from the creation time in milliseconds.
///
/// Ids are strictly increasing: a second id requested within the same
/// millisecond is bumped past the previous one.
#[derive(Debug, Clone, Default)]
pub struct ConversationIdGenerator {
    last: i64,
}

impl ConversationIdGenerator {
    pub fn next_id(&mut self, now: DateTime<Utc>) -> ConversationId {
        let millis = now.timestamp_millis().max(self.last + 1);
        self.last = millis;
        ConversationId(millis.to_string())
    }
}

/// Timing and size figures reported by the service for an assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyMetrics {
    pub response_time_ms: u64,
    pub token_count: u64,
}

/// A single turn in a conversation. Never modified after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
    pub metrics: Option<ReplyMetrics>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            role: Role::User,
            timestamp: Utc::now(),
            metrics: None,
        }
    }

    pub fn assistant(content: impl Into<String>, metrics: ReplyMetrics) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            role: Role::Assistant,
            timestamp: Utc::now(),
            metrics: Some(metrics),
        }
    }

    pub fn response_time_ms(&self) -> Option<u64> {
        self.metrics.map(|m| m.response_time_ms)
    }

    pub fn token_count(&self) -> Option<u64> {
        self.metrics.map(|m| m.token_count)
    }
}

/// A named, categorized thread of messages
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: ConversationId,
    pub name: String,
    pub category: Category,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: ConversationId, name: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            messages: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(Category::from_str("code").unwrap(), Category::Code);
        assert_eq!(Category::from_str("Analysis").unwrap(), Category::Analysis);
        assert!(Category::from_str("poetry").is_err());
        assert_eq!(Category::Explanation.to_string(), "explanation");
    }

    #[test]
    fn category_cycle_wraps() {
        assert_eq!(Category::General.next(), Category::Code);
        assert_eq!(Category::Analysis.next(), Category::General);
    }

    #[test]
    fn conversation_ids_are_unique_within_one_millisecond() {
        let mut ids = ConversationIdGenerator::default();
        let now = Utc::now();
        let first = ids.next_id(now);
        let second = ids.next_id(now);
        assert_ne!(first, second);
        assert_eq!(first.as_str(), now.timestamp_millis().to_string());
    }

    #[test]
    fn only_assistant_messages_carry_metrics() {
        let user = Message::user("hello");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.response_time_ms(), None);

        let reply = Message::assistant(
            "hi",
            ReplyMetrics {
                response_time_ms: 120,
                token_count: 5,
            },
        );
        assert_eq!(reply.response_time_ms(), Some(120));
        assert_eq!(reply.token_count(), Some(5));
        assert_ne!(user.id, reply.id);
    }
}
