//! Terminal event loop.
//!
//! State is only touched here, one action at a time. Network effects run on
//! spawned tasks and come back through a channel as actions.

use crate::client::ChatClient;
use crate::config::Config;
use crate::dispatcher;
use crate::events::{Action, Effect, InputEdit};
use crate::state::AppState;
use crate::ui;
use crate::ui::conversation::{ComposerResult, ConversationComposer};
use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub struct App {
    config: Config,
    client: ChatClient,
    state: AppState,
    composer: ConversationComposer,
    actions_tx: mpsc::UnboundedSender<Action>,
    actions_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = ChatClient::new(&config).context("Failed to create HTTP client")?;
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            client,
            state: AppState::new(),
            composer: ConversationComposer::new(),
            actions_tx,
            actions_rx,
        })
    }

    /// Apply one action and start whatever effect it asks for
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        let (state, effect) = state.update(action);
        self.state = state;
        self.composer.sync(&self.state.input);

        if let Some(effect) = effect {
            self.spawn(effect);
        }
    }

    fn spawn(&self, effect: Effect) {
        let client = self.client.clone();
        let tx = self.actions_tx.clone();
        tokio::spawn(async move {
            let action = dispatcher::perform(&client, effect).await;
            // The receiver is gone only when the app is shutting down
            let _ = tx.send(action);
        });
    }

    async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        tracing::info!(base_url = %self.client.base_url(), "Starting chatdesk");
        self.dispatch(Action::CheckHealth);

        let mut events = EventStream::new();
        let tick_rate = Duration::from_millis(self.config.ui.tick_rate_ms.max(16));
        let mut tick = tokio::time::interval(tick_rate);

        loop {
            terminal.draw(|frame| ui::draw(frame, &self.state, &self.composer, &self.config.ui))?;

            if self.state.should_quit {
                tracing::info!("Exiting");
                return Ok(());
            }

            tokio::select! {
                _ = tick.tick() => {}
                Some(action) = self.actions_rx.recv() => self.dispatch(action),
                event = events.next() => match event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                    None => return Ok(()),
                },
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => self.dispatch(Action::Edit(InputEdit::InsertStr(text))),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if let Some(action) = self.global_shortcut(key) {
            self.dispatch(action);
            return;
        }

        match self.composer.handle_key(key, &self.state.input) {
            ComposerResult::Edit(edit) => self.dispatch(Action::Edit(edit)),
            ComposerResult::Submitted => self.dispatch(Action::Send),
            ComposerResult::Command(command) => {
                tracing::debug!(command = command.command.command(), "Running slash command");
                self.dispatch(Action::Edit(InputEdit::Clear));
                if let Some(action) = command.to_action() {
                    self.dispatch(action);
                }
            }
            ComposerResult::Handled => {}
            ComposerResult::Ignored => match key.code {
                KeyCode::Esc if self.state.show_help => self.dispatch(Action::ToggleHelp),
                KeyCode::Esc => self.dispatch(Action::DismissError),
                _ => {}
            },
        }
    }

    fn global_shortcut(&self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let switching = (ctrl || alt) && !self.composer.is_palette_open();

        match key.code {
            KeyCode::Char('c') if ctrl => Some(Action::Quit),
            KeyCode::Char('n') if ctrl => {
                let category = self.state.store.active().category.next();
                Some(Action::CreateConversation {
                    category,
                    name: None,
                })
            }
            KeyCode::Char('d') if ctrl => {
                Some(Action::DeleteConversation(self.state.store.active_id().clone()))
            }
            KeyCode::Char('r') if ctrl => Some(Action::CheckHealth),
            KeyCode::Up if switching => Some(Action::SelectPrevious),
            KeyCode::Down if switching => Some(Action::SelectNext),
            KeyCode::Char(c @ '1'..='9') if alt => {
                let index = c as usize - '1' as usize;
                let action = self.state.store.conversations().get(index).map_or(
                    Action::SelectIndex(index),
                    |conversation| Action::SelectConversation(conversation.id.clone()),
                );
                Some(action)
            }
            _ => None,
        }
    }
}

/// Raw mode and the alternate screen, undone on drop so an error or panic
/// never leaves the terminal unusable
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)
            .context("Failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal() {
            tracing::warn!(error = %e, "Failed to restore terminal");
        }
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste, Show)
        .context("Failed to leave alternate screen")?;
    Ok(())
}

/// Run the interactive UI until the user quits
pub async fn run(config: Config) -> Result<()> {
    let mut app = App::new(config)?;
    let _guard = TerminalGuard::enter()?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(io::stdout())).context("Failed to create terminal")?;
    app.run(&mut terminal).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn app() -> App {
        let config = Config {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Config::default()
        };
        App::new(config).unwrap()
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    #[tokio::test]
    async fn slash_command_runs_and_clears_input() {
        let mut app = app();
        type_text(&mut app, "/new code");
        app.handle_key(key(KeyCode::Enter, KeyModifiers::NONE));

        assert_eq!(app.state.store.len(), 2);
        assert_eq!(app.state.store.active().category, Category::Code);
        assert!(app.state.input.content.is_empty());
        assert!(!app.composer.is_palette_open());
    }

    #[tokio::test]
    async fn ctrl_n_cycles_categories() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        app.handle_key(key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        assert_eq!(app.state.store.len(), 3);
        assert_eq!(app.state.store.active().category, Category::Explanation);
        assert!(app.state.input.content.is_empty());
    }

    #[tokio::test]
    async fn failed_send_reports_through_channel() {
        let mut app = app();
        type_text(&mut app, "hello");
        app.handle_key(key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(app.state.in_flight);

        let action = app.actions_rx.recv().await.unwrap();
        app.dispatch(action);

        assert!(!app.state.in_flight);
        assert_eq!(app.state.error.as_deref(), Some("Failed to send message"));
        assert_eq!(app.state.store.active().messages.len(), 1);

        app.handle_key(key(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.state.error, None);
    }

    #[tokio::test]
    async fn alt_digit_and_ctrl_d_target_conversations_by_id() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('n'), KeyModifiers::CONTROL));
        app.handle_key(key(KeyCode::Char('1'), KeyModifiers::ALT));
        assert_eq!(app.state.store.active_index(), 0);

        app.handle_key(key(KeyCode::Char('9'), KeyModifiers::ALT));
        assert_eq!(app.state.store.active_index(), 0);
        assert!(app.state.input.content.is_empty());

        app.handle_key(key(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(app.state.store.len(), 1);
        assert_eq!(app.state.store.active().category, Category::Code);
    }

    #[test]
    fn terminal_guard_drop_never_panics() {
        // Restoring twice must be harmless
        drop(TerminalGuard);
        drop(TerminalGuard);
    }

    #[tokio::test]
    async fn ctrl_c_quits() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.state.should_quit);
    }
}
