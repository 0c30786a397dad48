//! In-memory conversation collection.
//!
//! Every operation consumes the store and hands back the next version, so
//! callers only ever observe whole-collection replacements.

use crate::model::{Category, Conversation, ConversationId, ConversationIdGenerator, Message};
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active: ConversationId,
    ids: ConversationIdGenerator,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// A store holding a single empty general conversation, which is active.
    pub fn new() -> Self {
        let mut ids = ConversationIdGenerator::default();
        let id = ids.next_id(Utc::now());
        let name = Category::General.default_name();
        let first = Conversation::new(id.clone(), name, Category::General);
        Self {
            conversations: vec![first],
            active: id,
            ids,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn active_id(&self) -> &ConversationId {
        &self.active
    }

    pub fn active(&self) -> &Conversation {
        self.get(&self.active).unwrap_or(&self.conversations[0])
    }

    pub fn active_index(&self) -> usize {
        self.conversations
            .iter()
            .position(|c| c.id == self.active)
            .unwrap_or(0)
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    /// Append a new empty conversation and make it active.
    #[must_use]
    pub fn create(mut self, category: Category, name: impl Into<String>) -> Self {
        let id = self.ids.next_id(Utc::now());
        tracing::debug!(conversation = %id, %category, "Creating conversation");
        self.conversations.push(Conversation::new(id.clone(), name, category));
        self.active = id;
        self
    }

    /// Remove a conversation. The last remaining conversation is never removed.
    #[must_use]
    pub fn delete(mut self, id: &ConversationId) -> Self {
        if self.conversations.len() <= 1 {
            return self;
        }

        self.conversations.retain(|c| &c.id != id);
        self.active = resolve_active(&self.conversations, &self.active);
        self
    }

    #[must_use]
    pub fn set_active(mut self, id: &ConversationId) -> Self {
        self.active = resolve_active(&self.conversations, id);
        self
    }

    /// Append `message` to the conversation `id`; other conversations are untouched.
    #[must_use]
    pub fn append_message(mut self, id: &ConversationId, message: Message) -> Self {
        match self.conversations.iter_mut().find(|c| &c.id == id) {
            Some(conversation) => conversation.messages.push(message),
            None => {
                tracing::debug!(conversation = %id, "Dropping message for unknown conversation")
            }
        }
        self
    }
}

/// Resolve `requested` against `conversations`: the id itself if present,
/// otherwise the first conversation's id.
///
/// `conversations` must not be empty.
pub fn resolve_active(
    conversations: &[Conversation],
    requested: &ConversationId,
) -> ConversationId {
    if conversations.iter().any(|c| &c.id == requested) {
        requested.clone()
    } else {
        conversations[0].id.clone()
    }
}
