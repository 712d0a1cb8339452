//! Query execution.
//!
//! Runs a classified query against the open database. Reads commit as soon
//! as they finish; mutations run inside a transaction that is handed back
//! open. Statements that manage transactions themselves are refused, so the
//! gate stays the only owner of the open transaction.

use std::fmt;
use std::time::Instant;

use crate::db::{DatabaseClient, ExecutionResult, HeldTransaction};
use crate::error::{PeekError, Result};
use crate::safety::{controls_transaction, QueryKind};
use tracing::{info, warn};

const TRANSACTION_REFUSED: &str = "Transaction statements are not allowed; \
     pending changes are committed with 'y' and rolled back with 'n'";

/// What executing a query produced.
pub enum Execution {
    /// A read finished; there is nothing to hold.
    Completed(ExecutionResult),
    /// A mutation ran; its transaction is still open.
    Held {
        result: ExecutionResult,
        transaction: Box<dyn HeldTransaction>,
    },
}

impl Execution {
    /// Returns the result, whichever path produced it.
    pub fn result(&self) -> &ExecutionResult {
        match self {
            Self::Completed(result) | Self::Held { result, .. } => result,
        }
    }
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(result) => f.debug_tuple("Completed").field(result).finish(),
            Self::Held { result, .. } => f
                .debug_struct("Held")
                .field("result", result)
                .finish_non_exhaustive(),
        }
    }
}

/// Runs queries against a database client.
pub struct QueryExecutor<'a> {
    db: &'a dyn DatabaseClient,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db }
    }

    /// Executes `sql` according to `kind`.
    ///
    /// Fails with a query error for empty text, transaction-control
    /// statements, or anything the database rejects. A failed query leaves
    /// no transaction behind.
    pub async fn execute(&self, sql: &str, kind: QueryKind) -> Result<Execution> {
        if sql.trim().is_empty() {
            return Err(PeekError::query("Empty query"));
        }
        if controls_transaction(sql) {
            return Err(PeekError::query(TRANSACTION_REFUSED));
        }

        let start = Instant::now();
        let outcome = match kind {
            QueryKind::Read => self.db.execute_query(sql).await.map(Execution::Completed),
            QueryKind::Mutating => {
                self.db
                    .execute_uncommitted(sql)
                    .await
                    .map(|(result, transaction)| Execution::Held {
                        result,
                        transaction,
                    })
            }
        };
        let elapsed = start.elapsed();

        match &outcome {
            Ok(execution) => info!(
                %kind,
                rows = execution.result().row_count(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Query executed"
            ),
            Err(e) => warn!(%kind, "Query failed: {e}"),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockDatabaseClient, MockEvent};

    #[tokio::test]
    async fn test_read_completes_without_transaction() {
        let db = MockDatabaseClient::new();
        let executor = QueryExecutor::new(&db);

        let execution = executor
            .execute("SELECT * FROM users", QueryKind::Read)
            .await
            .unwrap();

        assert!(matches!(execution, Execution::Completed(_)));
        assert_eq!(
            db.events(),
            vec![MockEvent::Executed("SELECT * FROM users".to_string())]
        );
    }

    #[tokio::test]
    async fn test_mutation_is_held_open() {
        let db = MockDatabaseClient::new().with_affected_rows(2);
        let executor = QueryExecutor::new(&db);

        let execution = executor
            .execute("DELETE FROM users", QueryKind::Mutating)
            .await
            .unwrap();

        assert_eq!(execution.result(), &ExecutionResult::affected(2));
        assert!(matches!(execution, Execution::Held { .. }));
        assert!(!db.events().contains(&MockEvent::Committed));
    }

    #[tokio::test]
    async fn test_empty_query_fails() {
        let db = MockDatabaseClient::new();
        let executor = QueryExecutor::new(&db);

        let err = executor.execute("   ", QueryKind::Read).await.unwrap_err();
        assert!(matches!(err, PeekError::Query(_)));
        assert!(db.events().is_empty());
    }

    #[tokio::test]
    async fn test_transaction_control_never_reaches_database() {
        let db = MockDatabaseClient::new();
        let executor = QueryExecutor::new(&db);

        for sql in ["BEGIN", "SELECT 1; COMMIT", "savepoint sp"] {
            let err = executor.execute(sql, QueryKind::Read).await.unwrap_err();
            assert!(matches!(err, PeekError::Query(_)), "{sql}");
        }
        assert!(db.events().is_empty());
    }

    #[tokio::test]
    async fn test_database_error_is_query_error() {
        let db = MockDatabaseClient::new().failing_on("emal", "no such column: emal");
        let executor = QueryExecutor::new(&db);

        let err = executor
            .execute("SELECT emal FROM users", QueryKind::Read)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Query error: no such column: emal");
    }
}
