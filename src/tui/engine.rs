//! Engine actor that owns the orchestrator and session.
//!
//! The TUI never touches the database directly: it sends [`EngineCommand`]s
//! and renders [`EngineResponse`]s. Commands are handled one at a time, so a
//! pending change can never race with another statement.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::app::{DisplayPayload, Mode, Notification, Orchestrator, Session};
use crate::config::LlmConfig;
use crate::db::{ExecutionResult, TableSummary};
use crate::error::{PeekError, Result};
use crate::llm::{create_client, LlmTranslator, Translator};

/// Channel capacity in both directions.
const CHANNEL_CAPACITY: usize = 32;

/// Commands sent from the TUI to the engine.
pub enum EngineCommand {
    /// A submitted input line.
    Submit(String),
    /// Commit the pending change.
    Confirm,
    /// Roll back the pending change.
    Cancel,
    ToggleMode,
    /// Refresh the table list.
    LoadTables,
    /// Load the rows of a table.
    OpenTable(String),
    /// Outcome of the background translator setup.
    TranslatorReady(Result<Arc<dyn Translator>>),
    /// Roll back anything pending and close the database.
    Shutdown,
}

/// Responses sent from the engine to the TUI.
#[derive(Debug, Clone)]
pub enum EngineResponse {
    /// Result of a submitted line. Replaces the generated SQL display.
    Input(DisplayPayload),
    /// Any other output pane update (confirm, cancel, setup failure).
    Output(DisplayPayload),
    Notify(Notification),
    ModeChanged(Mode),
    Busy(bool),
    Tables(Vec<TableSummary>),
    TableData {
        table: String,
        result: ExecutionResult,
    },
}

/// Handle for sending commands to the engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    async fn send(&self, command: EngineCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| PeekError::internal("Engine closed"))
    }

    pub async fn submit(&self, text: String) -> Result<()> {
        self.send(EngineCommand::Submit(text)).await
    }

    pub async fn confirm(&self) -> Result<()> {
        self.send(EngineCommand::Confirm).await
    }

    pub async fn cancel(&self) -> Result<()> {
        self.send(EngineCommand::Cancel).await
    }

    pub async fn toggle_mode(&self) -> Result<()> {
        self.send(EngineCommand::ToggleMode).await
    }

    pub async fn load_tables(&self) -> Result<()> {
        self.send(EngineCommand::LoadTables).await
    }

    pub async fn open_table(&self, table: String) -> Result<()> {
        self.send(EngineCommand::OpenTable(table)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(EngineCommand::Shutdown).await
    }

    /// Builds the configured translator and health-checks it in the
    /// background. The outcome arrives as [`EngineCommand::TranslatorReady`].
    pub fn start_translator(&self, config: LlmConfig) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = build_translator(&config).await;
            if tx.send(EngineCommand::TranslatorReady(outcome)).await.is_err() {
                debug!("Engine closed before translator setup finished");
            }
        });
    }
}

async fn build_translator(config: &LlmConfig) -> Result<Arc<dyn Translator>> {
    info!(provider = %config.provider, "Initializing translator");
    let client = create_client(config)?;
    let translator = LlmTranslator::new(client);
    translator.health_check().await?;
    Ok(Arc::new(translator))
}

/// The engine actor.
pub struct Engine {
    orchestrator: Orchestrator,
    session: Session,
    rx: mpsc::Receiver<EngineCommand>,
    tx: mpsc::Sender<EngineResponse>,
}

impl Engine {
    /// Creates the engine and its handle. The returned receiver carries every
    /// response, including busy-flag changes.
    pub fn spawn(
        orchestrator: Orchestrator,
    ) -> (EngineHandle, Self, mpsc::Receiver<EngineResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (resp_tx, resp_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let session = Session::new();

        forward_busy(session.subscribe_busy(), resp_tx.clone());

        let engine = Self {
            orchestrator,
            session,
            rx: cmd_rx,
            tx: resp_tx,
        };
        (EngineHandle { tx: cmd_tx }, engine, resp_rx)
    }

    /// Processes commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Engine started");
        while let Some(command) = self.rx.recv().await {
            if matches!(command, EngineCommand::Shutdown) {
                break;
            }
            self.handle(command).await;
        }

        if let Err(e) = self.orchestrator.shutdown(&mut self.session).await {
            warn!("Shutdown failed: {e}");
        }
        info!("Engine stopped");
    }

    async fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Submit(text) => {
                if let Some(payload) = self
                    .orchestrator
                    .handle_input(&mut self.session, &text)
                    .await
                {
                    self.respond(EngineResponse::Input(payload)).await;
                }
            }
            EngineCommand::Confirm => {
                if let Some(payload) = self.orchestrator.confirm(&mut self.session).await {
                    self.respond(EngineResponse::Output(payload)).await;
                    self.send_tables().await;
                }
            }
            EngineCommand::Cancel => {
                if let Some(payload) = self.orchestrator.cancel(&mut self.session).await {
                    self.respond(EngineResponse::Output(payload)).await;
                }
            }
            EngineCommand::ToggleMode => {
                let mode = self.session.toggle_mode();
                self.respond(EngineResponse::ModeChanged(mode)).await;
                self.respond(EngineResponse::Notify(Notification::info(format!(
                    "Switched to {}",
                    mode.label()
                ))))
                .await;
            }
            EngineCommand::LoadTables => self.send_tables().await,
            EngineCommand::OpenTable(table) => {
                match self.orchestrator.table_data(&mut self.session, &table).await {
                    Ok(result) => {
                        self.respond(EngineResponse::TableData { table, result })
                            .await
                    }
                    Err(e) => self.respond_error(&e).await,
                }
            }
            EngineCommand::TranslatorReady(Ok(translator)) => {
                let notification = self.orchestrator.install_translator(translator);
                self.respond(EngineResponse::Notify(notification)).await;
            }
            EngineCommand::TranslatorReady(Err(e)) => {
                let payload = self.orchestrator.disable_translator(&e);
                self.respond(EngineResponse::Output(payload)).await;
            }
            EngineCommand::Shutdown => {}
        }
    }

    async fn send_tables(&mut self) {
        match self.orchestrator.tables(&mut self.session).await {
            Ok(tables) => self.respond(EngineResponse::Tables(tables)).await,
            Err(e) => self.respond_error(&e).await,
        }
    }

    async fn respond_error(&mut self, error: &PeekError) {
        warn!("{error}");
        self.respond(EngineResponse::Notify(Notification::error(error.to_string())))
            .await;
    }

    /// Every payload carries the gate's current state, so a late message
    /// such as a translator failure cannot hide a pending change.
    async fn respond(&mut self, mut response: EngineResponse) {
        if let EngineResponse::Input(payload) | EngineResponse::Output(payload) = &mut response {
            payload.awaiting_confirmation = self.session.is_pending();
        }
        if self.tx.send(response).await.is_err() {
            debug!("TUI closed, dropping engine response");
        }
    }
}

/// Relays busy-flag changes as [`EngineResponse::Busy`].
fn forward_busy(mut busy: watch::Receiver<bool>, tx: mpsc::Sender<EngineResponse>) {
    tokio::spawn(async move {
        while busy.changed().await.is_ok() {
            let value = *busy.borrow_and_update();
            if tx.send(EngineResponse::Busy(value)).await.is_err() {
                break;
            }
        }
    });
}
