//! Mock database client for testing.
//!
//! Returns canned results and records every call, so transaction handling
//! can be asserted without a database file.

use super::{ColumnInfo, DatabaseClient, ExecutionResult, HeldTransaction, Schema, Value};
use crate::error::{PeekError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Something that happened to the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// Autocommit execution.
    Executed(String),
    /// Execution inside a held transaction.
    ExecutedUncommitted(String),
    Committed,
    RolledBack,
    Closed,
}

/// A mock database client that returns predefined results.
#[derive(Debug, Clone)]
pub struct MockDatabaseClient {
    schema: Schema,
    affected_rows: u64,
    failures: Vec<(String, String)>,
    fail_commit: bool,
    events: Arc<Mutex<Vec<MockEvent>>>,
}

impl MockDatabaseClient {
    /// Creates a mock with an empty schema that reports one affected row.
    pub fn new() -> Self {
        Self {
            schema: Schema::default(),
            affected_rows: 1,
            failures: Vec::new(),
            fail_commit: false,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Uses the given schema for introspection.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the row count reported for non-row-returning statements.
    pub fn with_affected_rows(mut self, rows: u64) -> Self {
        self.affected_rows = rows;
        self
    }

    /// Makes any statement containing `pattern` fail with `message`.
    pub fn failing_on(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.push((pattern.into(), message.into()));
        self
    }

    /// Makes every commit fail.
    pub fn with_failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Returns everything recorded so far.
    pub fn events(&self) -> Vec<MockEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, event: MockEvent) {
        record(&self.events, event);
    }

    fn run(&self, sql: &str) -> Result<ExecutionResult> {
        if let Some((_, message)) = self.failures.iter().find(|(p, _)| sql.contains(p.as_str())) {
            return Err(PeekError::query(message.clone()));
        }

        let upper = sql.trim_start().to_uppercase();
        if upper.starts_with("SELECT") || upper.starts_with("PRAGMA") || upper.starts_with("WITH")
        {
            Ok(ExecutionResult::row_set(
                vec![ColumnInfo::new("result", "TEXT")],
                vec![vec![Value::Text(format!("Mock result for: {}", sql))]],
            ))
        } else {
            Ok(ExecutionResult::affected(self.affected_rows))
        }
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

fn record(events: &Mutex<Vec<MockEvent>>, event: MockEvent) {
    match events.lock() {
        Ok(mut guard) => guard.push(event),
        Err(poisoned) => poisoned.into_inner().push(event),
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    async fn table_data(&self, table: &str) -> Result<ExecutionResult> {
        self.execute_query(&format!("SELECT * FROM {table}")).await
    }

    async fn execute_query(&self, sql: &str) -> Result<ExecutionResult> {
        self.record(MockEvent::Executed(sql.to_string()));
        self.run(sql)
    }

    async fn execute_uncommitted(
        &self,
        sql: &str,
    ) -> Result<(ExecutionResult, Box<dyn HeldTransaction>)> {
        self.record(MockEvent::ExecutedUncommitted(sql.to_string()));
        match self.run(sql) {
            Ok(result) => Ok((
                result,
                Box::new(MockTransaction {
                    events: Arc::clone(&self.events),
                    fail_commit: self.fail_commit,
                }),
            )),
            Err(e) => {
                self.record(MockEvent::RolledBack);
                Err(e)
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.record(MockEvent::Closed);
        Ok(())
    }
}

struct MockTransaction {
    events: Arc<Mutex<Vec<MockEvent>>>,
    fail_commit: bool,
}

#[async_trait]
impl HeldTransaction for MockTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        if self.fail_commit {
            record(&self.events, MockEvent::RolledBack);
            return Err(PeekError::query("database is locked"));
        }
        record(&self.events, MockEvent::Committed);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        record(&self.events, MockEvent::RolledBack);
        Ok(())
    }
}
