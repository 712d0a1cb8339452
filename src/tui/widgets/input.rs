//! Input widget for the TUI.
//!
//! A single text line titled with the current mode.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::Mode;

/// Calculates the scroll offset needed to keep the cursor visible.
///
/// Returns the number of characters to skip from the start of the text.
pub fn calculate_scroll_offset(cursor: usize, available_width: usize) -> usize {
    cursor.saturating_sub(available_width)
}

/// Input bar widget. `cursor` counts characters.
pub struct InputBar<'a> {
    text: &'a str,
    cursor: usize,
    focused: bool,
    mode: Mode,
}

impl<'a> InputBar<'a> {
    pub fn new(text: &'a str, cursor: usize, focused: bool, mode: Mode) -> Self {
        Self {
            text,
            cursor,
            focused,
            mode,
        }
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", self.mode.label()));

        let prompt_style = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);

        // Border left (1) + prompt "> " (2) + border right (1) + cursor space (1) = 5
        let available_width = area.width.saturating_sub(5) as usize;
        let scroll_offset = calculate_scroll_offset(self.cursor, available_width);

        let body = if self.text.is_empty() {
            Span::styled(self.mode.placeholder(), Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.text.chars().skip(scroll_offset).collect::<String>())
        };

        let line = Line::from(vec![Span::styled("> ", prompt_style), body]);
        Paragraph::new(line).block(block).render(area, buf);
    }
}
