use crate::events::InputEdit;
use crate::state::TextAreaState;
use crate::ui::conversation::commands::{
    CommandEntry, ParsedCommand, command_entries, parse_slash_command,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    Edit(InputEdit),
    Submitted,
    Command(ParsedCommand),
    /// The composer consumed the key without changing the text
    Handled,
    /// Not a composer key; the caller may interpret it
    Ignored,
}

/// Composer key handling and command palette state.
///
/// The text itself lives in [`TextAreaState`] on the app state; the composer
/// only tracks what the palette shows.
pub struct ConversationComposer {
    command_entries: Vec<CommandEntry>,
    filtered_commands: Vec<CommandEntry>,
    show_command_palette: bool,
    selected_command: Option<usize>,
    palette_dismissed: bool,
}

impl Default for ConversationComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationComposer {
    pub fn new() -> Self {
        Self {
            command_entries: command_entries(),
            filtered_commands: Vec::new(),
            show_command_palette: false,
            selected_command: None,
            palette_dismissed: false,
        }
    }

    /// Handle key input against the current text
    pub fn handle_key(&mut self, key: KeyEvent, input: &TextAreaState) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::Handled;
        }

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
                    return ComposerResult::Edit(InputEdit::Insert('\n'));
                }
                if self.show_command_palette {
                    if let Some(entry) = self.selected_entry() {
                        if input.content.trim() != format!("/{}", entry.keyword) {
                            return complete(entry);
                        }
                    }
                }
                if input.content.trim().is_empty() {
                    return ComposerResult::Handled;
                }
                match parse_slash_command(&input.content) {
                    Some(command) => ComposerResult::Command(command),
                    None => ComposerResult::Submitted,
                }
            }
            KeyCode::Tab if self.show_command_palette => match self.selected_entry() {
                Some(entry) => complete(entry),
                None => ComposerResult::Handled,
            },
            KeyCode::Up if self.show_command_palette => {
                self.move_command_selection(-1);
                ComposerResult::Handled
            }
            KeyCode::Down if self.show_command_palette => {
                self.move_command_selection(1);
                ComposerResult::Handled
            }
            KeyCode::Esc if self.show_command_palette => {
                self.close_command_palette();
                self.palette_dismissed = true;
                ComposerResult::Handled
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                ComposerResult::Edit(InputEdit::Insert(c))
            }
            KeyCode::Backspace => ComposerResult::Edit(InputEdit::Backspace),
            KeyCode::Delete => ComposerResult::Edit(InputEdit::Delete),
            KeyCode::Left => ComposerResult::Edit(InputEdit::Left),
            KeyCode::Right => ComposerResult::Edit(InputEdit::Right),
            KeyCode::Home => ComposerResult::Edit(InputEdit::Home),
            KeyCode::End => ComposerResult::Edit(InputEdit::End),
            _ => ComposerResult::Ignored,
        }
    }

    /// Refresh the palette after the text changed
    pub fn sync(&mut self, input: &TextAreaState) {
        let typing_command = input.content.starts_with('/')
            && !input.content.chars().any(char::is_whitespace);

        if !typing_command {
            self.palette_dismissed = false;
            self.close_command_palette();
            return;
        }
        if self.palette_dismissed {
            return;
        }

        self.show_command_palette = true;
        self.refresh_command_palette(input);
    }

    pub fn is_palette_open(&self) -> bool {
        self.show_command_palette
    }

    fn selected_entry(&self) -> Option<CommandEntry> {
        self.selected_command
            .and_then(|index| self.filtered_commands.get(index))
            .copied()
    }

    fn close_command_palette(&mut self) {
        self.show_command_palette = false;
        self.filtered_commands.clear();
        self.selected_command = None;
    }

    fn refresh_command_palette(&mut self, input: &TextAreaState) {
        let query = input.content.trim_start_matches('/').to_lowercase();
        self.filtered_commands = self
            .command_entries
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .copied()
            .collect();

        if self.filtered_commands.is_empty() {
            self.selected_command = None;
        } else {
            let index = self.selected_command.unwrap_or(0);
            self.selected_command = Some(index.min(self.filtered_commands.len() - 1));
        }
    }

    fn move_command_selection(&mut self, delta: isize) {
        if self.filtered_commands.is_empty() {
            self.selected_command = None;
            return;
        }

        let current = self.selected_command.unwrap_or(0) as isize;
        let len = self.filtered_commands.len() as isize;
        let next = (current + delta).rem_euclid(len);
        self.selected_command = Some(next as usize);
    }
}

fn complete(entry: CommandEntry) -> ComposerResult {
    ComposerResult::Edit(InputEdit::Replace(format!("/{} ", entry.keyword)))
}

/// Renders the composer for one frame
pub struct ComposerView<'a> {
    pub composer: &'a ConversationComposer,
    pub input: &'a TextAreaState,
    pub placeholder: String,
    pub disabled: bool,
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.disabled {
            "⏳ Waiting for reply"
        } else {
            "📤 Enter to send, Shift+Enter for new line"
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(if self.disabled {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.input.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content: Vec<char> = self.input.content.chars().collect();
            if !self.disabled {
                let at = self.input.cursor_position.min(content.len());
                content.insert(at, '▌');
            }
            let content: String = content.into_iter().collect();

            // Keep the cursor line visible when the text is taller than the box
            let lines: Vec<&str> = content.split('\n').collect();
            let height = inner_area.height as usize;
            let start = lines.len().saturating_sub(height);
            for (i, line_text) in lines[start..].iter().enumerate() {
                let line = Line::from(vec![Span::raw(*line_text)]);
                buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
            }
        }

        if self.composer.show_command_palette {
            render_palette(self.composer, inner_area, buf);
        }
    }
}

fn render_palette(composer: &ConversationComposer, inner_area: Rect, buf: &mut Buffer) {
    let filtered = &composer.filtered_commands;
    let palette_height = (filtered.len().min(7) + 2) as u16;
    let palette_area = Rect {
        x: inner_area.x,
        y: inner_area.y.saturating_sub(palette_height + 1),
        width: inner_area.width,
        height: palette_height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Commands")
        .style(Style::default().fg(Color::Blue));
    let inner = block.inner(palette_area);
    ratatui::widgets::Clear.render(palette_area, buf);
    block.render(palette_area, buf);

    for (index, entry) in filtered.iter().enumerate() {
        if index >= inner.height as usize {
            break;
        }

        let style = if composer.selected_command == Some(index) {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let line = Line::from(vec![
            Span::styled(format!("/{}", entry.keyword), style),
            Span::styled(" - ", Style::default().fg(Color::DarkGray)),
            Span::styled(entry.description, Style::default().fg(Color::Gray)),
        ]);

        buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::conversation::commands::SlashCommand;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn text(content: &str) -> TextAreaState {
        TextAreaState {
            content: content.to_string(),
            cursor_position: content.chars().count(),
        }
    }

    #[test]
    fn enter_submits_plain_text() {
        let mut composer = ConversationComposer::new();
        let enter = press(KeyCode::Enter);
        assert_eq!(composer.handle_key(enter, &text("hi")), ComposerResult::Submitted);
        assert_eq!(composer.handle_key(enter, &text("  ")), ComposerResult::Handled);
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut composer = ConversationComposer::new();
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(
            composer.handle_key(key, &text("hi")),
            ComposerResult::Edit(InputEdit::Insert('\n'))
        );
    }

    #[test]
    fn palette_filters_and_completes() {
        let mut composer = ConversationComposer::new();
        composer.sync(&text("/de"));
        assert!(composer.is_palette_open());
        assert_eq!(composer.filtered_commands.len(), 1);

        assert_eq!(
            composer.handle_key(press(KeyCode::Tab), &text("/de")),
            ComposerResult::Edit(InputEdit::Replace("/delete ".to_string()))
        );

        composer.sync(&text("/delete "));
        assert!(!composer.is_palette_open());
    }

    #[test]
    fn enter_on_complete_command_runs_it() {
        let mut composer = ConversationComposer::new();
        composer.sync(&text("/health"));
        match composer.handle_key(press(KeyCode::Enter), &text("/health")) {
            ComposerResult::Command(parsed) => assert_eq!(parsed.command, SlashCommand::Health),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn escape_closes_palette_until_text_changes_shape() {
        let mut composer = ConversationComposer::new();
        composer.sync(&text("/"));
        assert!(composer.is_palette_open());
        assert_eq!(composer.handle_key(press(KeyCode::Esc), &text("/")), ComposerResult::Handled);
        composer.sync(&text("/n"));
        assert!(!composer.is_palette_open());

        composer.sync(&text(""));
        composer.sync(&text("/"));
        assert!(composer.is_palette_open());
    }

    #[test]
    fn selection_wraps() {
        let mut composer = ConversationComposer::new();
        composer.sync(&text("/"));
        composer.handle_key(press(KeyCode::Up), &text("/"));
        let last = composer.filtered_commands.len() - 1;
        assert_eq!(composer.selected_command, Some(last));
        composer.handle_key(press(KeyCode::Down), &text("/"));
        assert_eq!(composer.selected_command, Some(0));
    }

    #[test]
    fn unrelated_keys_are_ignored() {
        let mut composer = ConversationComposer::new();
        assert_eq!(composer.handle_key(press(KeyCode::Esc), &text("")), ComposerResult::Ignored);
        assert_eq!(composer.handle_key(press(KeyCode::Up), &text("")), ComposerResult::Ignored);
    }
}
