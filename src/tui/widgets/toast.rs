//! Bottom-right popup for engine notifications.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::app::{Notification, Severity};

const MAX_WIDTH: u16 = 50;
/// Borders, icon and padding around the message.
const CHROME: u16 = 6;

pub struct Toast<'a> {
    notification: &'a Notification,
}

impl<'a> Toast<'a> {
    pub fn new(notification: &'a Notification) -> Self {
        Self { notification }
    }

    /// Sized to the message, capped at [`MAX_WIDTH`], two cells from the right edge.
    pub fn area(&self, screen: Rect) -> Rect {
        let wanted = self.notification.message.chars().count() as u16 + CHROME;
        let width = wanted.min(MAX_WIDTH).min(screen.width.saturating_sub(4));
        let height = 3.min(screen.height);
        Rect::new(
            screen.x + screen.width.saturating_sub(width + 2),
            screen.y + screen.height.saturating_sub(height + 1),
            width,
            height,
        )
    }
}

fn severity_style(severity: Severity) -> (Color, &'static str) {
    match severity {
        Severity::Information => (Color::Green, "✓"),
        Severity::Warning => (Color::Yellow, "!"),
        Severity::Error => (Color::Red, "✗"),
    }
}

/// Keeps at most `max_chars` characters, marking a cut with an ellipsis.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some(_) => {
            let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
            format!("{kept}…")
        }
    }
}

impl Widget for Toast<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (color, icon) = severity_style(self.notification.severity);
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(area);
        block.render(area, buf);

        let room = (inner.width as usize).saturating_sub(2);
        let line = Line::from(vec![
            Span::styled(format!("{icon} "), Style::default().fg(color)),
            Span::styled(
                truncate(&self.notification.message, room),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}
