use crate::store::ConversationStore;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Conversation list with message counts; the active entry is highlighted
pub struct Sidebar<'a> {
    pub store: &'a ConversationStore,
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Conversations ({})", self.store.len()));
        let inner = block.inner(area);
        block.render(area, buf);

        let active = self.store.active_id();
        let mut y = inner.y;

        for (index, conversation) in self.store.conversations().iter().enumerate() {
            if y + 1 >= inner.y + inner.height {
                break;
            }

            let is_active = &conversation.id == active;
            let name_style = if is_active {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let name = Line::from(vec![
                Span::styled(format!("{} ", index + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{} ", conversation.category.icon())),
                Span::styled(conversation.name.clone(), name_style),
            ]);
            let count = Line::from(Span::styled(
                format!("     {} msgs", conversation.messages.len()),
                Style::default().fg(Color::DarkGray),
            ));

            buf.set_line(inner.x, y, &name, inner.width);
            buf.set_line(inner.x, y + 1, &count, inner.width);
            y += 2;
        }

        let footer = Line::from(Span::styled(
            "Ctrl+N new  Ctrl+D delete",
            Style::default().fg(Color::DarkGray),
        ));
        if inner.height > 0 {
            buf.set_line(inner.x, inner.y + inner.height - 1, &footer, inner.width);
        }
    }
}
