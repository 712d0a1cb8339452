//! Banner drawn over the content while a change is held.
//!
//! The output pane underneath keeps the query and affected row count
//! visible; the banner only carries the key prompt.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};

const WIDTH: u16 = 56;
const HEIGHT: u16 = 6;

/// Stateless; place it with [`ConfirmBanner::area`].
pub struct ConfirmBanner;

impl ConfirmBanner {
    /// Centers the banner in `parent`, shrinking it on small terminals.
    pub fn area(parent: Rect) -> Rect {
        let [row] = Layout::vertical([Constraint::Length(HEIGHT.min(parent.height))])
            .flex(Flex::Center)
            .areas(parent);
        let [cell] = Layout::horizontal([Constraint::Length(WIDTH.min(parent.width))])
            .flex(Flex::Center)
            .areas(row);
        cell
    }
}

fn key_hint(key: &'static str, label: &'static str, color: Color) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(label),
    ]
}

impl Widget for ConfirmBanner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let mut prompt = vec![Span::raw("Commit? ")];
        prompt.extend(key_hint("[y]", " Yes  ", Color::Green));
        prompt.extend(key_hint("[n/Esc]", " Roll back", Color::Red));

        let lines = vec![
            Line::from("Transaction open, nothing committed yet.")
                .yellow()
                .bold(),
            Line::default(),
            Line::from(prompt),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Confirm Changes ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black));

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
