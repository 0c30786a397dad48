//! Message pane for the active conversation

use crate::model::{Category, Conversation, Message, Role};
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders one conversation, newest lines at the bottom
pub struct ConversationHistory<'a> {
    pub conversation: &'a Conversation,
    pub thinking: bool,
    pub show_metrics: bool,
    /// Shown instead of the messages when set
    pub help: Option<String>,
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            "{} {}",
            self.conversation.category.icon(),
            self.conversation.name
        );
        let block = Block::default().borders(Borders::ALL).title(title);

        let inner_area = block.inner(area);
        block.render(area, buf);

        let all_lines: Vec<Line<'static>> = if let Some(help) = &self.help {
            let style = Style::default().fg(Color::Yellow);
            help.lines()
                .map(|l| Line::from(Span::styled(l.to_string(), style)))
                .collect()
        } else if self.conversation.is_empty() && !self.thinking {
            empty_state(self.conversation)
        } else {
            let mut lines = Vec::new();
            for message in &self.conversation.messages {
                lines.append(&mut self.render_message(message, inner_area.width));
                // spacing between messages
                lines.push(Line::from(""));
            }
            if self.thinking {
                lines.push(thinking_line());
            }
            lines
        };

        // Show the tail so the latest message stays in view
        let height = inner_area.height as usize;
        let start = all_lines.len().saturating_sub(height);
        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

impl ConversationHistory<'_> {
    /// Render a single message into lines
    fn render_message(&self, message: &Message, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let content_lines = wrap_text(&message.content, width.saturating_sub(2) as usize);
        for (i, content_line) in content_lines.into_iter().enumerate() {
            let lead = if i == 0 {
                format!("{} ", message.role.avatar())
            } else {
                "   ".to_string()
            };
            lines.push(Line::from(vec![
                Span::raw(lead),
                Span::styled(content_line, content_style(message.role)),
            ]));
        }

        lines.push(footer_line(message, self.show_metrics));
        lines
    }
}

fn footer_line(message: &Message, show_metrics: bool) -> Line<'static> {
    let muted = Style::default().fg(Color::DarkGray);
    let badge = Style::default().fg(Color::Cyan);

    let time = message.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string();
    let mut spans = vec![Span::raw("   "), Span::styled(time, muted)];

    if show_metrics {
        if let Some(ms) = message.response_time_ms().filter(|ms| *ms > 0) {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("[{ms}ms]"), badge));
        }
        if let Some(tokens) = message.token_count().filter(|t| *t > 0) {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!("[{tokens} tokens]"), badge));
        }
    }

    Line::from(spans)
}

fn thinking_line() -> Line<'static> {
    let dots = match (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 300)
        % 4
    {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "   ",
    };

    Line::from(vec![
        Span::raw("🤖 "),
        Span::styled("Thinking", Style::default().fg(Color::Green)),
        Span::styled(dots, Style::default().fg(Color::Yellow)),
    ])
}

fn empty_state(conversation: &Conversation) -> Vec<Line<'static>> {
    let (title, hint) = if conversation.category == Category::General {
        (
            "Start chatting!".to_string(),
            "Type a message below or start a new conversation with /new or Ctrl+N.",
        )
    } else {
        (
            format!("{} Conversation", conversation.name),
            "Type your question or request below to get started.",
        )
    };

    vec![
        Line::from(Span::styled("💬", Style::default())),
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to send, Shift+Enter for new line. /help lists commands.",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn content_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Blue),
        Role::Assistant => Style::default().fg(Color::Green),
    }
}

/// Wrap text to fit within the given width, keeping explicit line breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.chars().count();
            if current_width == 0 {
                current_line.push_str(word);
                current_width = word_width;
            } else if current_width + word_width + 1 <= width {
                current_line.push(' ');
                current_line.push_str(word);
                current_width += word_width + 1;
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
                current_width = word_width;
            }
        }

        lines.push(current_line);
    }

    lines
}
