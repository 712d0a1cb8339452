//! Terminal user interface for sqlpeek.
//!
//! The runner draws [`App`] state, turns key presses into engine commands
//! and applies engine responses as they arrive.

pub mod app;
pub mod engine;
mod ui;
pub mod widgets;

pub use app::{Action, App};
pub use engine::{Engine, EngineCommand, EngineHandle, EngineResponse};

use std::io::{self, Stdout};
use std::panic;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{PeekError, Result};

/// Key polling interval; also the redraw tick for spinners and toasts.
const TICK_RATE: Duration = Duration::from_millis(100);

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: Self::setup_terminal()?,
        })
    }

    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| PeekError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .map_err(|e| PeekError::internal(format!("Failed to enter alternate screen: {e}")))?;

        Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| PeekError::internal(format!("Failed to create terminal: {e}")))
    }

    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| PeekError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .map_err(|e| PeekError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| PeekError::internal(format!("Failed to show cursor: {e}")))
    }

    /// Runs until the operator quits, then shuts the engine down.
    pub async fn run(
        &mut self,
        mut app: App,
        engine: EngineHandle,
        mut responses: mpsc::Receiver<EngineResponse>,
    ) -> Result<()> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        engine.load_tables().await?;
        let result = self.event_loop(&mut app, &engine, &mut responses).await;

        info!("Leaving TUI");
        if let Err(e) = engine.shutdown().await {
            warn!("Engine already stopped: {e}");
        }

        let _ = panic::take_hook();
        result
    }

    async fn event_loop(
        &mut self,
        app: &mut App,
        engine: &EngineHandle,
        responses: &mut mpsc::Receiver<EngineResponse>,
    ) -> Result<()> {
        while app.running {
            app.clear_expired_toast();

            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| PeekError::internal(format!("Failed to draw: {e}")))?;

            tokio::select! {
                event = tokio::task::spawn_blocking(|| {
                    if crossterm::event::poll(TICK_RATE).unwrap_or(false) {
                        crossterm::event::read().ok()
                    } else {
                        None
                    }
                }) => {
                    if let Ok(Some(Event::Key(key))) = event {
                        if key.kind == KeyEventKind::Press {
                            let action = app.handle_key(key);
                            self.dispatch(action, app, engine).await?;
                        }
                    }
                }

                response = responses.recv() => match response {
                    Some(response) => app.apply(response),
                    None => {
                        warn!("Engine stopped unexpectedly");
                        app.running = false;
                    }
                },
            }
        }
        Ok(())
    }

    async fn dispatch(&self, action: Action, app: &mut App, engine: &EngineHandle) -> Result<()> {
        debug!(?action, "Dispatching");
        match action {
            Action::None => {}
            Action::Submit(text) => engine.submit(text).await?,
            Action::Confirm => engine.confirm().await?,
            Action::Cancel => engine.cancel().await?,
            Action::ToggleMode => engine.toggle_mode().await?,
            Action::LoadTables => engine.load_tables().await?,
            Action::OpenTable(table) => engine.open_table(table).await?,
            Action::Quit => app.running = false,
        }
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
