use crate::client::ChatReply;
use crate::model::{Category, ConversationId, HealthStatus};

/// Everything that can change application state
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Edit the composer contents
    Edit(InputEdit),

    /// Send the composer contents to the active conversation
    Send,

    /// The service answered a chat request
    ChatSucceeded {
        conversation_id: ConversationId,
        reply: ChatReply,
    },

    /// A chat request failed; carries the text for the error banner
    ChatFailed { error: String },

    /// Re-probe service health
    CheckHealth,

    /// Health probe finished
    HealthChecked(HealthStatus),

    /// Start a new conversation; `None` uses the category's default name
    CreateConversation {
        category: Category,
        name: Option<String>,
    },

    /// Delete a conversation by id unless it is the last one
    DeleteConversation(ConversationId),

    /// Delete the active conversation unless it is the last one
    DeleteActive,

    /// Make a conversation active; unknown ids fall back to the first entry
    SelectConversation(ConversationId),

    /// Select by zero-based position in the sidebar
    SelectIndex(usize),

    SelectNext,

    SelectPrevious,

    DismissError,

    ToggleHelp,

    Quit,
}

/// Composer edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEdit {
    Insert(char),
    InsertStr(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Replace(String),
    Clear,
}

/// Outbound work requested by a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Chat {
        conversation_id: ConversationId,
        content: String,
    },
    CheckHealth,
}
