//! Grid widget: the table list or the rows of one table.
//!
//! Column widths are sized from the content and capped, NULLs are dimmed.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row as TableRow, StatefulWidget, Table, TableState, Widget},
};

use crate::db::{ColumnInfo, Row, TableSummary};
use crate::tui::app::GridView;

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Grid panel widget.
pub struct Grid<'a> {
    view: &'a GridView,
    selected: usize,
    focused: bool,
}

impl<'a> Grid<'a> {
    pub fn new(view: &'a GridView, selected: usize, focused: bool) -> Self {
        Self {
            view,
            selected,
            focused,
        }
    }

    fn block(&self) -> Block<'a> {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let title = match self.view {
            GridView::Tables(_) => " Tables ".to_string(),
            GridView::Data { table, rows, .. } => format!(" {} ({} rows) ", table, rows.len()),
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
    }
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Calculates the width of each column from its header and values.
pub fn column_widths(columns: &[ColumnInfo], rows: &[Row]) -> Vec<usize> {
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|col| col.name.chars().count().max(MIN_COLUMN_WIDTH))
        .collect();

    for row in rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.to_string().chars().count());
        }
    }

    widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
}

/// Truncates a string to `max_width` characters, adding an ellipsis if needed.
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    }
}

fn table_list(tables: &[TableSummary]) -> Table<'static> {
    let rows = tables.iter().map(|t| {
        TableRow::new(vec![
            Cell::from(t.name.clone()),
            Cell::from(t.row_count.to_string()),
        ])
    });
    Table::new(rows, [Constraint::Min(10), Constraint::Length(10)])
        .header(TableRow::new(vec!["Table", "Rows"]).style(header_style()))
}

fn table_data(columns: &[ColumnInfo], rows: &[Row]) -> Table<'static> {
    let widths = column_widths(columns, rows);
    let header = TableRow::new(
        columns
            .iter()
            .zip(&widths)
            .map(|(col, &w)| Cell::from(truncate(&col.name, w))),
    )
    .style(header_style());

    let body = rows.iter().map(|row| {
        TableRow::new(row.iter().zip(&widths).map(|(value, &w)| {
            let text = truncate(&value.to_string(), w);
            if value.is_null() {
                Cell::from(Line::from(Span::styled(
                    text,
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )))
            } else {
                Cell::from(text)
            }
        }))
    });

    let constraints = widths.iter().map(|&w| Constraint::Length(w as u16));
    Table::new(body, constraints).header(header)
}

impl Widget for Grid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let table = match self.view {
            GridView::Tables(tables) => table_list(tables),
            GridView::Data { columns, rows, .. } => table_data(columns, rows),
        };

        let highlight = if self.focused {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let table = table
            .block(block)
            .column_spacing(2)
            .highlight_symbol("> ")
            .highlight_style(highlight);

        let mut state = TableState::default().with_selected(Some(self.selected));
        StatefulWidget::render(table, area, buf, &mut state);
    }
}
