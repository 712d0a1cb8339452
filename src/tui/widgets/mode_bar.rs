//! Mode bar: current mode, busy spinner and the last generated SQL.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::spinner::Spinner;
use crate::app::Mode;

pub struct ModeBar<'a> {
    mode: Mode,
    spinner: Option<&'a Spinner>,
    generated_sql: Option<&'a str>,
}

impl<'a> ModeBar<'a> {
    pub fn new(mode: Mode, spinner: Option<&'a Spinner>, generated_sql: Option<&'a str>) -> Self {
        Self {
            mode,
            spinner,
            generated_sql,
        }
    }

    fn mode_style(&self) -> Style {
        let bg = match self.mode {
            Mode::DirectQuery => Color::Cyan,
            Mode::Assisted => Color::Magenta,
        };
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }
}

impl Widget for ModeBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = vec![
            Span::styled(format!(" {} ", self.mode.label()), self.mode_style()),
            Span::raw(" "),
        ];

        if let Some(spinner) = self.spinner {
            spans.push(Span::styled(
                spinner.display(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw("  "));
        }

        if let Some(sql) = self.generated_sql {
            // Generated SQL may span lines; the bar has one.
            let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
            spans.push(Span::styled("Generated: ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(
                flat,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC),
            ));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
