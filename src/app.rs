//! Core orchestrator for sqlpeek.
//!
//! Routes operator input through the translator (assisted mode) or straight
//! to the executor (direct mode), parks mutations in the transaction gate,
//! and turns every outcome, errors included, into a [`DisplayPayload`].

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::db::{DatabaseClient, ExecutionResult, TableSummary};
use crate::error::{PeekError, Result};
use crate::llm::{Translation, Translator};
use crate::query::{
    format_result, Execution, GateState, PendingChange, Query, QueryExecutor, TransactionGate,
};
use crate::safety::Classifier;

/// How submitted text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Text is SQL and runs as typed.
    #[default]
    DirectQuery,
    /// Text is a request that the translator turns into SQL.
    Assisted,
}

impl Mode {
    /// Returns the other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::DirectQuery => Self::Assisted,
            Self::Assisted => Self::DirectQuery,
        }
    }

    /// Label for the mode bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::DirectQuery => "SQL Mode",
            Self::Assisted => "AI Mode",
        }
    }

    /// Placeholder for the input line.
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::DirectQuery => "Enter SQL query...",
            Self::Assisted => "Ask anything for AI assistance...",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

/// A short message shown as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Information,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Everything the display needs after one engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPayload {
    /// Plain text for the output pane.
    pub body: String,
    /// Optional toast.
    pub notification: Option<Notification>,
    /// SQL produced by the translator, if any.
    pub generated_sql: Option<String>,
    /// True while a change waits for `y`/`n`.
    pub awaiting_confirmation: bool,
}

impl DisplayPayload {
    fn new(body: impl Into<String>, notification: Notification) -> Self {
        Self {
            body: body.into(),
            notification: Some(notification),
            generated_sql: None,
            awaiting_confirmation: false,
        }
    }

    fn with_generated_sql(mut self, sql: Option<String>) -> Self {
        self.generated_sql = sql;
        self
    }

    fn pending(change: &PendingChange, notification: Notification) -> Self {
        Self {
            body: format!(
                "SQL Query:\n{}\n\nPENDING: {} row(s) will be affected\n\nCONFIRM CHANGES?\nPress 'y' to commit or 'n' to cancel",
                change.query, change.rowcount
            ),
            notification: Some(notification),
            generated_sql: None,
            awaiting_confirmation: true,
        }
    }

    fn error(error: &PeekError) -> Self {
        match error {
            PeekError::Query(message) => Self::new(
                format!("SQL Error:\n\n{message}"),
                Notification::error(format!("SQL Error: {message}")),
            ),
            other => Self::new(
                format!("Error:\n\n{}", other.message()),
                Notification::error(format!("Error: {}", other.message())),
            ),
        }
    }
}

/// Availability of assisted mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslatorStatus {
    /// Client created, health check still running.
    Initializing,
    Ready,
    /// Setup failed; assisted mode stays disabled.
    Unavailable(String),
}

/// Per-operator state: mode, pending change and the busy indicator.
#[derive(Debug)]
pub struct Session {
    mode: Mode,
    gate: TransactionGate,
    busy: Arc<watch::Sender<bool>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Starts in direct-query mode with nothing pending.
    pub fn new() -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            mode: Mode::default(),
            gate: TransactionGate::new(),
            busy: Arc::new(busy),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Flips the mode and returns the new one.
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        info!(mode = %self.mode, "Mode toggled");
        self.mode
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn is_pending(&self) -> bool {
        self.gate.is_pending()
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Receiver that follows the busy indicator.
    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    fn begin_busy(&self) -> BusyGuard {
        BusyGuard::raise(&self.busy)
    }
}

/// Raises the busy flag; lowers it when dropped.
#[must_use]
pub struct BusyGuard {
    busy: Arc<watch::Sender<bool>>,
}

impl BusyGuard {
    fn raise(busy: &Arc<watch::Sender<bool>>) -> Self {
        busy.send_replace(true);
        Self {
            busy: Arc::clone(busy),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}

/// The main orchestrator that coordinates all components.
pub struct Orchestrator {
    db: Arc<dyn DatabaseClient>,
    classifier: Classifier,
    translator: Option<Arc<dyn Translator>>,
    translator_status: TranslatorStatus,
}

impl Orchestrator {
    /// Creates an orchestrator whose translator is still being set up.
    pub fn new(db: Arc<dyn DatabaseClient>, classifier: Classifier) -> Self {
        Self {
            db,
            classifier,
            translator: None,
            translator_status: TranslatorStatus::Initializing,
        }
    }

    /// Installs a translator that is already known to work.
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.install_translator(translator);
        self
    }

    /// Enables assisted mode once the translator passed its health check.
    pub fn install_translator(&mut self, translator: Arc<dyn Translator>) -> Notification {
        self.translator = Some(translator);
        self.translator_status = TranslatorStatus::Ready;
        info!("Translator ready");
        Notification::info("AI assistant ready")
    }

    /// Disables assisted mode after a setup failure. Browsing keeps working.
    pub fn disable_translator(&mut self, error: &PeekError) -> DisplayPayload {
        let reason = error.message().to_string();
        warn!("Translator unavailable: {reason}");
        self.translator = None;
        self.translator_status = TranslatorStatus::Unavailable(reason.clone());
        DisplayPayload::new(
            format!(
                "AI Initialization Failed\n\n{reason}\n\nPlease check your LLM configuration. SQL mode and browsing still work."
            ),
            Notification::error(format!("Failed to initialize AI: {reason}")),
        )
    }

    /// Handles one submitted line. Blank input yields `None`.
    pub async fn handle_input(&self, session: &mut Session, text: &str) -> Option<DisplayPayload> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(change) = session.gate.pending() {
            return Some(DisplayPayload::pending(
                change,
                Notification::warning("Resolve the pending change first: 'y' to commit, 'n' to cancel"),
            ));
        }

        let _busy = session.begin_busy();
        let payload = match session.mode {
            Mode::DirectQuery => self.run_query(session, Query::direct(text)).await,
            Mode::Assisted => self.run_assisted(session, text).await,
        };
        Some(payload)
    }

    /// Commits the pending change. `None` when nothing is pending.
    pub async fn confirm(&self, session: &mut Session) -> Option<DisplayPayload> {
        let _busy = session.begin_busy();
        let outcome = session.gate.confirm().await?;
        Some(match outcome {
            Ok(change) => DisplayPayload::new(
                format!(
                    "SQL Query:\n{}\n\n✓ Changes committed\n{} row(s) affected",
                    change.query, change.rowcount
                ),
                Notification::info("Changes committed successfully"),
            ),
            Err(e) => DisplayPayload::new(
                format!(
                    "Commit failed:\n\n{}\n\nThe change was not applied.",
                    e.message()
                ),
                Notification::error(format!("Commit failed: {}", e.message())),
            ),
        })
    }

    /// Rolls back the pending change. `None` when nothing is pending.
    pub async fn cancel(&self, session: &mut Session) -> Option<DisplayPayload> {
        let _busy = session.begin_busy();
        let outcome = session.gate.cancel().await?;
        Some(match outcome {
            Ok(change) => DisplayPayload::new(
                format!(
                    "SQL Query:\n{}\n\n✗ Changes rolled back\nNo rows were modified",
                    change.query
                ),
                Notification::warning("Changes rolled back"),
            ),
            Err(e) => DisplayPayload::new(
                format!("Rollback failed:\n\n{}", e.message()),
                Notification::error(format!("Rollback failed: {}", e.message())),
            ),
        })
    }

    /// Table names and row counts for the grid.
    ///
    /// Takes `&mut Session` so the future stays `Send`; held transactions are
    /// not `Sync`.
    pub async fn tables(&self, session: &mut Session) -> Result<Vec<TableSummary>> {
        Self::ensure_idle(session)?;
        Ok(self.db.introspect_schema().await?.summaries())
    }

    /// Every row of `table` for the grid.
    pub async fn table_data(&self, session: &mut Session, table: &str) -> Result<ExecutionResult> {
        Self::ensure_idle(session)?;
        self.db.table_data(table).await
    }

    /// Rolls back anything still pending and closes the database.
    pub async fn shutdown(&self, session: &mut Session) -> Result<()> {
        if let Some(Err(e)) = session.gate.cancel().await {
            warn!("Rollback on shutdown failed: {e}");
        }
        self.db.close().await
    }

    fn ensure_idle(session: &Session) -> Result<()> {
        if session.is_pending() {
            return Err(PeekError::internal("A change is awaiting confirmation"));
        }
        Ok(())
    }

    async fn run_assisted(&self, session: &mut Session, text: &str) -> DisplayPayload {
        let Some(translator) = self.translator.as_ref() else {
            return self.assisted_unavailable();
        };

        let schema = match self.db.introspect_schema().await {
            Ok(schema) => schema.describe(),
            Err(e) => return DisplayPayload::error(&e),
        };

        match translator.translate(text, &schema).await {
            Ok(Translation::NoQuery) => DisplayPayload::new(
                format!(
                    "Request: {text}\n\nUnable to interpret a database query from this request.\nPlease provide more specific information or ask questions about your data."
                ),
                Notification::info("Could not interpret query from request"),
            ),
            Ok(Translation::Query(sql)) => {
                info!(sql = %sql, "Translated request");
                self.run_query(session, Query::translated(sql.clone(), text))
                    .await
                    .with_generated_sql(Some(sql))
            }
            Err(e) => {
                warn!("Translation failed: {e}");
                DisplayPayload::error(&e)
            }
        }
    }

    fn assisted_unavailable(&self) -> DisplayPayload {
        match &self.translator_status {
            TranslatorStatus::Initializing => DisplayPayload::new(
                "AI assistant is still starting up.\n\nTry again in a moment, or press 't' to switch to SQL mode.",
                Notification::warning("AI assistant not ready yet"),
            ),
            TranslatorStatus::Unavailable(reason) => DisplayPayload::new(
                format!(
                    "AI assistant not available.\n\n{reason}\n\nPlease check your LLM configuration and restart. Press 't' to switch to SQL mode."
                ),
                Notification::error("AI assistant not available"),
            ),
            TranslatorStatus::Ready => DisplayPayload::new(
                "AI assistant not available.",
                Notification::error("AI assistant not available"),
            ),
        }
    }

    async fn run_query(&self, session: &mut Session, query: Query) -> DisplayPayload {
        let kind = self.classifier.classify(&query.text);
        let executor = QueryExecutor::new(self.db.as_ref());

        match executor.execute(&query.text, kind).await {
            Err(e) => DisplayPayload::error(&e),
            Ok(Execution::Completed(result)) => {
                let notification = match &result {
                    ExecutionResult::RowSet { rows, .. } => {
                        Notification::info(format!("Query returned {} rows", rows.len()))
                    }
                    ExecutionResult::AffectedCount { rowcount } => {
                        Notification::info(format!("Query executed: {rowcount} row(s) affected"))
                    }
                };
                DisplayPayload::new(format_result(&result, query.label()), notification)
            }
            Ok(Execution::Held {
                result,
                transaction,
            }) => {
                let rowcount = result.row_count();
                if let Err(e) = session.gate.hold(query.text, rowcount, transaction).await {
                    return DisplayPayload::error(&e);
                }
                match session.gate.pending() {
                    Some(change) => DisplayPayload::pending(
                        change,
                        Notification::warning(format!(
                            "Press 'y' to commit or 'n' to cancel ({rowcount} rows)"
                        )),
                    ),
                    None => DisplayPayload::error(&PeekError::internal(
                        "Transaction was not held",
                    )),
                }
            }
        }
    }
}
