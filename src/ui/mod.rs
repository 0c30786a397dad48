//! Screen layout: header, sidebar, error banner, message pane and composer

pub mod conversation;
pub mod sidebar;

use crate::config::UiConfig;
use crate::model::HealthStatus;
use crate::state::AppState;
use conversation::{ComposerView, ConversationComposer, ConversationHistory, get_help_text};
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use sidebar::Sidebar;

const SIDEBAR_WIDTH: u16 = 32;

pub fn draw(frame: &mut Frame, state: &AppState, composer: &ConversationComposer, ui: &UiConfig) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(frame.size());

    frame.render_widget(Header { health: state.health }, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(rows[1]);

    frame.render_widget(Sidebar { store: &state.store }, columns[0]);

    let banner_height = if state.error.is_some() { 3 } else { 0 };
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(5),
            Constraint::Length(composer_height(state)),
        ])
        .split(columns[1]);

    if let Some(error) = &state.error {
        frame.render_widget(ErrorBanner { message: error }, main[0]);
    }

    let active = state.store.active();
    frame.render_widget(
        ConversationHistory {
            conversation: active,
            thinking: state.in_flight,
            show_metrics: ui.show_metrics,
            help: state.show_help.then(get_help_text),
        },
        main[1],
    );

    frame.render_widget(
        ComposerView {
            composer,
            input: &state.input,
            placeholder: format!("Type your message for {}...", active.name),
            disabled: state.in_flight,
        },
        main[2],
    );
}

/// Grow the composer with its line count, up to a few lines
fn composer_height(state: &AppState) -> u16 {
    let lines = state.input.content.split('\n').count().clamp(1, 6) as u16;
    lines + 2
}

struct Header {
    health: HealthStatus,
}

impl Widget for Header {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        block.render(area, buf);

        let title = Line::from(vec![
            Span::raw("🤖 "),
            Span::styled("chatdesk", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        ]);
        buf.set_line(inner.x, inner.y, &title, inner.width);

        let status_color = match self.health {
            HealthStatus::Unknown => Color::Gray,
            HealthStatus::Healthy => Color::Green,
            HealthStatus::Unhealthy => Color::Red,
        };
        let status = Line::from(vec![
            Span::styled(self.health.label(), Style::default().fg(status_color)),
            Span::styled("  Ctrl+R", Style::default().fg(Color::DarkGray)),
        ]);
        let status_width = status.width() as u16;
        let x = inner.x + inner.width.saturating_sub(status_width);
        buf.set_line(x, inner.y, &status, inner.width.min(status_width));
    }
}

struct ErrorBanner<'a> {
    message: &'a str,
}

impl Widget for ErrorBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Esc to dismiss")
            .style(Style::default().fg(Color::Red));
        let inner = block.inner(area);
        block.render(area, buf);

        let line = Line::from(vec![
            Span::raw("⚠️ "),
            Span::styled(self.message.to_string(), Style::default().fg(Color::Red)),
        ]);
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}
