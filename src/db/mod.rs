//! Database abstraction layer for sqlpeek.
//!
//! A trait-based seam over the single open database so that the executor,
//! the transaction gate and the orchestrator can run against either a real
//! SQLite file or an in-memory mock.

mod mock;
mod schema;
mod sqlite;
mod types;

pub use mock::{MockDatabaseClient, MockEvent};
pub use schema::{quote_identifier, Schema, Table, TableSummary, SCHEMA_HEADER};
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, ExecutionResult, Row, Value};

use crate::error::{PeekError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Required file extension for database paths.
pub const DATABASE_EXTENSION: &str = "db";

/// Interface to the one open database.
///
/// Implementations own exactly one connection; all calls are serialised on it.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Introspects the user tables: names, row counts, columns, creation SQL.
    async fn introspect_schema(&self) -> Result<Schema>;

    /// Returns every row of a table.
    async fn table_data(&self, table: &str) -> Result<ExecutionResult>;

    /// Runs a statement in its own transaction and commits it straight away,
    /// so nothing is left open on the connection.
    async fn execute_query(&self, sql: &str) -> Result<ExecutionResult>;

    /// Opens a transaction, runs the statement inside it and hands the
    /// transaction back still open. On failure the transaction is rolled back
    /// before the error is returned.
    async fn execute_uncommitted(
        &self,
        sql: &str,
    ) -> Result<(ExecutionResult, Box<dyn HeldTransaction>)>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}

/// A database transaction that has executed but is neither committed nor
/// rolled back. Consumed by whichever of the two happens.
#[async_trait]
pub trait HeldTransaction: Send {
    /// Makes the changes permanent.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards the changes.
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Checks that `path` is an absolute path to an existing `.db` file.
pub fn validate_database_path(path: &Path) -> Result<()> {
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == DATABASE_EXTENSION);
    if !has_extension {
        return Err(PeekError::validation(format!(
            "Invalid file type. Expected .db file, got: {}",
            path.display()
        )));
    }

    if !path.is_absolute() {
        return Err(PeekError::validation(format!(
            "Path must be absolute, got relative path: {}",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(PeekError::validation(format!(
            "Database file not found: {}",
            path.display()
        )));
    }

    Ok(())
}
