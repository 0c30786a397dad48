//! Application state and its transition function.
//!
//! `AppState::update` is the only way state changes. It never performs I/O;
//! outbound requests come back out as an [`Effect`] for the app loop to run.

use crate::events::{Action, Effect, InputEdit};
use crate::model::{HealthStatus, Message, ReplyMetrics};
use crate::store::ConversationStore;

/// Text being composed, with a cursor measured in characters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextAreaState {
    pub content: String,
    pub cursor_position: usize,
}

impl TextAreaState {
    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.content.len())
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn apply(&mut self, edit: InputEdit) {
        match edit {
            InputEdit::Insert(c) => {
                let offset = self.byte_offset(self.cursor_position);
                self.content.insert(offset, c);
                self.cursor_position += 1;
            }
            InputEdit::InsertStr(text) => {
                let offset = self.byte_offset(self.cursor_position);
                self.content.insert_str(offset, &text);
                self.cursor_position += text.chars().count();
            }
            InputEdit::Backspace => {
                if self.cursor_position > 0 {
                    self.cursor_position -= 1;
                    let offset = self.byte_offset(self.cursor_position);
                    self.content.remove(offset);
                }
            }
            InputEdit::Delete => {
                if self.cursor_position < self.char_len() {
                    let offset = self.byte_offset(self.cursor_position);
                    self.content.remove(offset);
                }
            }
            InputEdit::Left => {
                self.cursor_position = self.cursor_position.saturating_sub(1);
            }
            InputEdit::Right => {
                if self.cursor_position < self.char_len() {
                    self.cursor_position += 1;
                }
            }
            InputEdit::Home => self.cursor_position = 0,
            InputEdit::End => self.cursor_position = self.char_len(),
            InputEdit::Replace(text) => {
                self.cursor_position = text.chars().count();
                self.content = text;
            }
            InputEdit::Clear => {
                self.content.clear();
                self.cursor_position = 0;
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub store: ConversationStore,
    pub input: TextAreaState,
    /// Set while a chat request is outstanding
    pub in_flight: bool,
    pub error: Option<String>,
    pub health: HealthStatus,
    pub show_help: bool,
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn update(mut self, action: Action) -> (Self, Option<Effect>) {
        match action {
            Action::Edit(edit) => {
                if !self.in_flight {
                    self.input.apply(edit);
                }
                (self, None)
            }
            Action::Send => self.send(),
            Action::ChatSucceeded {
                conversation_id,
                reply,
            } => {
                let metrics = ReplyMetrics {
                    response_time_ms: as_count(reply.response_time),
                    token_count: as_count(reply.token_count),
                };
                let message = Message::assistant(reply.content, metrics);
                self.store = self.store.append_message(&conversation_id, message);
                self.in_flight = false;
                (self, None)
            }
            Action::ChatFailed { error } => {
                self.error = Some(error);
                self.in_flight = false;
                (self, None)
            }
            Action::CheckHealth => (self, Some(Effect::CheckHealth)),
            Action::HealthChecked(status) => {
                self.health = status;
                (self, None)
            }
            Action::CreateConversation { category, name } => {
                let name = name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| category.default_name().to_string());
                self.store = self.store.create(category, name);
                (self, None)
            }
            Action::DeleteConversation(id) => {
                self.store = self.store.delete(&id);
                (self, None)
            }
            Action::DeleteActive => {
                let id = self.store.active_id().clone();
                self.store = self.store.delete(&id);
                (self, None)
            }
            Action::SelectConversation(id) => {
                self.store = self.store.set_active(&id);
                (self, None)
            }
            Action::SelectIndex(index) => {
                if let Some(id) = self.store.conversations().get(index).map(|c| c.id.clone()) {
                    self.store = self.store.set_active(&id);
                }
                (self, None)
            }
            Action::SelectNext => self.select_offset(1),
            Action::SelectPrevious => self.select_offset(-1),
            Action::DismissError => {
                self.error = None;
                (self, None)
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                (self, None)
            }
            Action::Quit => {
                self.should_quit = true;
                (self, None)
            }
        }
    }

    fn send(mut self) -> (Self, Option<Effect>) {
        let content = self.input.content.trim().to_string();
        if content.is_empty() || self.in_flight {
            return (self, None);
        }

        let conversation_id = self.store.active_id().clone();
        self.store = self
            .store
            .append_message(&conversation_id, Message::user(content.clone()));
        self.input.apply(InputEdit::Clear);
        self.in_flight = true;
        self.error = None;

        (
            self,
            Some(Effect::Chat {
                conversation_id,
                content,
            }),
        )
    }

    fn select_offset(mut self, delta: isize) -> (Self, Option<Effect>) {
        let len = self.store.len() as isize;
        let next = (self.store.active_index() as isize + delta).rem_euclid(len) as usize;
        let id = self.store.conversations()[next].id.clone();
        self.store = self.store.set_active(&id);
        (self, None)
    }
}

/// Service metrics arrive as JSON numbers; keep them as whole non-negative counts.
fn as_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
