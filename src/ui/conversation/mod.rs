//! Conversation UI components for chat interface

pub mod commands;
pub mod composer;
pub mod history;

pub use commands::get_help_text;
pub use composer::{ComposerResult, ComposerView, ConversationComposer};
pub use history::ConversationHistory;
