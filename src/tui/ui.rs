//! UI rendering for the TUI.
//!
//! Layout: header, output pane beside the grid, mode bar, input line.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Focus};
use super::widgets::{confirm, grid, header, input, mode_bar, toast};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Output + grid
            Constraint::Length(1), // Mode bar
            Constraint::Length(3), // Input
        ])
        .split(area);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_layout[1]);

    frame.render_widget(header::Header::new(&app.database_name), main_layout[0]);
    render_output(frame, content_layout[0], app);
    frame.render_widget(
        grid::Grid::new(&app.grid, app.selected, app.focus == Focus::Grid),
        content_layout[1],
    );
    frame.render_widget(
        mode_bar::ModeBar::new(app.mode, app.spinner.as_ref(), app.generated_sql.as_deref()),
        main_layout[2],
    );
    render_input(frame, main_layout[3], app);

    if app.awaiting_confirmation {
        frame.render_widget(confirm::ConfirmBanner, confirm::ConfirmBanner::area(main_layout[1]));
    }

    if let Some(active) = &app.toast {
        let popup = toast::Toast::new(&active.notification);
        let toast_area = popup.area(area);
        frame.render_widget(popup, toast_area);
    }
}

/// Renders the scrollable output pane.
fn render_output(frame: &mut Frame, area: Rect, app: &App) {
    let border_style = if app.focus == Focus::Output {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Output ");

    let paragraph = Paragraph::new(app.output.as_str())
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Renders the input bar and places the cursor.
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Input && !app.awaiting_confirmation;
    frame.render_widget(
        input::InputBar::new(&app.input.text, app.input.cursor, focused, app.mode),
        area,
    );

    if focused {
        let available_width = area.width.saturating_sub(5) as usize;
        let visible_cursor =
            app.input.cursor - input::calculate_scroll_offset(app.input.cursor, available_width);
        // Border (1) + prompt "> " (2)
        let cursor_x = area.x + 1 + 2 + visible_cursor as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{DisplayPayload, Notification};
    use crate::tui::engine::EngineResponse;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_initial_screen() {
        let app = App::new("shop.db");
        let text = screen_text(&app);
        assert!(text.contains("sqlpeek"));
        assert!(text.contains("Welcome to sqlpeek"));
        assert!(text.contains("Tables"));
        assert!(text.contains("SQL Mode"));
    }

    #[test]
    fn test_pending_change_shows_banner_and_toast() {
        let mut app = App::new("shop.db");
        app.apply(EngineResponse::Input(DisplayPayload {
            body: "SQL Query:\nDELETE FROM users".to_string(),
            notification: Some(Notification::warning("Press 'y' to commit")),
            generated_sql: None,
            awaiting_confirmation: true,
        }));
        let text = screen_text(&app);
        assert!(text.contains("Confirm Changes"));
        assert!(text.contains("Press 'y' to commit"));
    }
}
