//! Application state for the TUI.
//!
//! Key handling is pure: [`App::handle_key`] updates local state and returns
//! the [`Action`] the runner must forward to the engine.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{DisplayPayload, Mode, Notification};
use crate::db::{ColumnInfo, ExecutionResult, Row, TableSummary};
use crate::query::format::row_to_json;
use crate::tui::engine::EngineResponse;
use crate::tui::widgets::spinner::Spinner;

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Lines moved per PageUp/PageDown in the output pane.
const PAGE_SCROLL: u16 = 10;

/// Initial output pane text.
pub const WELCOME_TEXT: &str = "Welcome to sqlpeek\n\n\
Type a query below and press Enter.\n\n\
Keys:\n\
  Tab      cycle focus (input, tables, output)\n\
  Enter    open table / show row details (tables pane)\n\
  b        back to the table list\n\
  t        toggle SQL / AI mode\n\
  q        quit (outside the input)\n\
  Ctrl+C   quit\n\n\
Changes from INSERT, UPDATE and DELETE are held until you press 'y' to commit or 'n' to cancel.";

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Grid,
    Output,
}

impl Focus {
    /// Cycles to the next focus panel.
    pub fn next(self) -> Self {
        match self {
            Self::Input => Self::Grid,
            Self::Grid => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// What the right-hand grid shows.
#[derive(Debug, Clone, PartialEq)]
pub enum GridView {
    Tables(Vec<TableSummary>),
    Data {
        table: String,
        columns: Vec<ColumnInfo>,
        rows: Vec<Row>,
    },
}

impl GridView {
    fn len(&self) -> usize {
        match self {
            Self::Tables(tables) => tables.len(),
            Self::Data { rows, .. } => rows.len(),
        }
    }
}

/// Work the runner hands to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Submit(String),
    Confirm,
    Cancel,
    ToggleMode,
    LoadTables,
    OpenTable(String),
    Quit,
}

/// Input state for text editing. `cursor` counts characters, not bytes.
#[derive(Debug, Default)]
pub struct InputState {
    pub text: String,
    pub cursor: usize,
}

impl InputState {
    /// Creates a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.text
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Clears the input and returns the previous text.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

/// A notification with the time it was raised.
#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    shown_at: Instant,
}

impl Toast {
    fn new(notification: Notification) -> Self {
        Self {
            notification,
            shown_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_DURATION
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub focus: Focus,
    pub mode: Mode,
    pub input: InputState,
    /// Output pane text.
    pub output: String,
    pub output_scroll: u16,
    pub grid: GridView,
    /// Selected grid row.
    pub selected: usize,
    /// Last SQL produced by the translator.
    pub generated_sql: Option<String>,
    pub awaiting_confirmation: bool,
    pub busy: bool,
    /// Present while the engine is busy.
    pub spinner: Option<Spinner>,
    pub toast: Option<Toast>,
    /// File name of the open database, for the header.
    pub database_name: String,
}

impl App {
    /// Creates the initial state.
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            running: true,
            focus: Focus::default(),
            mode: Mode::default(),
            input: InputState::new(),
            output: WELCOME_TEXT.to_string(),
            output_scroll: 0,
            grid: GridView::Tables(Vec::new()),
            selected: 0,
            generated_sql: None,
            awaiting_confirmation: false,
            busy: false,
            spinner: None,
            toast: None,
            database_name: database_name.into(),
        }
    }

    /// Shows a toast, replacing any previous one.
    pub fn notify(&mut self, notification: Notification) {
        self.toast = Some(Toast::new(notification));
    }

    /// Drops the toast once it has been visible long enough.
    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    /// Maps a key press to local state changes and an engine action.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        if self.awaiting_confirmation {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Action::Confirm,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Action::Cancel,
                _ => {
                    self.notify(Notification::warning(
                        "Press 'y' to commit or 'n' to cancel",
                    ));
                    Action::None
                }
            };
        }

        if key.code == KeyCode::Tab {
            self.focus = self.focus.next();
            return Action::None;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Grid => self.handle_grid_key(key),
            Focus::Output => self.handle_output_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => {
                if self.input.text.trim().is_empty() {
                    return Action::None;
                }
                if self.busy {
                    self.notify(Notification::warning("Still working on the last request"));
                    return Action::None;
                }
                Action::Submit(self.input.take())
            }
            KeyCode::Char(c) => {
                self.input.insert(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.input.backspace();
                Action::None
            }
            KeyCode::Delete => {
                self.input.delete();
                Action::None
            }
            KeyCode::Left => {
                self.input.move_left();
                Action::None
            }
            KeyCode::Right => {
                self.input.move_right();
                Action::None
            }
            KeyCode::Home => {
                self.input.move_home();
                Action::None
            }
            KeyCode::End => {
                self.input.move_end();
                Action::None
            }
            KeyCode::Esc => {
                self.input.take();
                Action::None
            }
            _ => Action::None,
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                if self.selected + 1 < self.grid.len() {
                    self.selected += 1;
                }
                Action::None
            }
            KeyCode::Enter => match &self.grid {
                GridView::Tables(tables) => tables
                    .get(self.selected)
                    .map(|t| Action::OpenTable(t.name.clone()))
                    .unwrap_or(Action::None),
                GridView::Data { columns, rows, .. } => {
                    if let Some(row) = rows.get(self.selected) {
                        self.output = row_details(columns, row);
                        self.output_scroll = 0;
                    }
                    Action::None
                }
            },
            KeyCode::Char('b') if matches!(self.grid, GridView::Data { .. }) => {
                Action::LoadTables
            }
            _ => self.handle_global_key(key),
        }
    }

    fn handle_output_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up => {
                self.output_scroll = self.output_scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                self.output_scroll = self.output_scroll.saturating_add(1);
                Action::None
            }
            KeyCode::PageUp => {
                self.output_scroll = self.output_scroll.saturating_sub(PAGE_SCROLL);
                Action::None
            }
            KeyCode::PageDown => {
                self.output_scroll = self.output_scroll.saturating_add(PAGE_SCROLL);
                Action::None
            }
            _ => self.handle_global_key(key),
        }
    }

    /// Keys that work in every pane except the input line.
    fn handle_global_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('t') => Action::ToggleMode,
            KeyCode::Char('q') => Action::Quit,
            _ => Action::None,
        }
    }

    /// Applies an engine response.
    pub fn apply(&mut self, response: EngineResponse) {
        match response {
            EngineResponse::Input(payload) => {
                self.generated_sql = payload.generated_sql.clone();
                self.show(payload);
            }
            EngineResponse::Output(payload) => self.show(payload),
            EngineResponse::Notify(notification) => self.notify(notification),
            EngineResponse::ModeChanged(mode) => {
                self.mode = mode;
                if mode == Mode::DirectQuery {
                    self.generated_sql = None;
                }
            }
            EngineResponse::Busy(busy) => {
                self.busy = busy;
                self.spinner = busy.then(|| Spinner::for_mode(self.mode));
            }
            EngineResponse::Tables(tables) => {
                self.grid = GridView::Tables(tables);
                self.selected = 0;
            }
            EngineResponse::TableData { table, result } => {
                let (columns, rows) = match result {
                    ExecutionResult::RowSet { columns, rows } => (columns, rows),
                    ExecutionResult::AffectedCount { .. } => (Vec::new(), Vec::new()),
                };
                self.grid = GridView::Data {
                    table,
                    columns,
                    rows,
                };
                self.selected = 0;
            }
        }
    }

    /// The payload's `awaiting_confirmation` is authoritative; the engine
    /// stamps it from the gate on every send.
    fn show(&mut self, payload: DisplayPayload) {
        self.output = payload.body;
        self.output_scroll = 0;
        self.awaiting_confirmation = payload.awaiting_confirmation;
        if let Some(notification) = payload.notification {
            self.notify(notification);
        }
        if self.awaiting_confirmation {
            self.focus = Focus::Input;
        }
    }
}

/// Pretty JSON for one grid row.
fn row_details(columns: &[ColumnInfo], row: &Row) -> String {
    let json = serde_json::to_string_pretty(&row_to_json(columns, row))
        .unwrap_or_else(|e| format!("<unprintable row: {e}>"));
    format!("Row Details:\n\n{json}")
}
