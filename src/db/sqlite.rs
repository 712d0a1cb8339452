//! SQLite database client implementation.
//!
//! Provides `SqliteClient`, which implements `DatabaseClient` over a sqlx
//! pool capped at a single connection.

use crate::db::schema::quote_identifier;
use crate::db::{
    ColumnInfo, DatabaseClient, ExecutionResult, HeldTransaction, Row, Schema, Table, Value,
};
use crate::error::{PeekError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Sqlite, Statement, Transaction};
use sqlx::{TypeInfo, Value as SqlxValue, ValueRef};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// How long to wait on a locked database file before failing.
const BUSY_TIMEOUT_SECS: u64 = 5;

/// How long to wait for the single pooled connection.
const ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens an existing database file. The file is never created.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(|e| {
                PeekError::connection(format!("Failed to open {}: {e}", path.display()))
            })?;

        debug!("Opened database {}", path.display());
        Ok(Self { pool })
    }

    async fn fetch_columns(&self, table: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", quote_identifier(table)))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PeekError::query(format!("Failed to fetch columns for {table}: {e}")))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("name")
                    .map_err(|e| PeekError::query(format!("Bad table_info row: {e}")))
            })
            .collect()
    }

    async fn count_rows(&self, table: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", quote_identifier(table)))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PeekError::query(format!("Failed to count rows in {table}: {e}")))
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        let entries: Vec<(String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT name, sql
            FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PeekError::query(format!("Failed to fetch tables: {e}")))?;

        let mut tables = Vec::with_capacity(entries.len());
        for (name, create_sql) in entries {
            let row_count = self.count_rows(&name).await?;
            let columns = self.fetch_columns(&name).await?;
            tables.push(Table {
                name,
                row_count,
                columns,
                create_sql: create_sql.unwrap_or_default(),
            });
        }

        Ok(Schema { tables })
    }

    async fn table_data(&self, table: &str) -> Result<ExecutionResult> {
        let sql = format!("SELECT * FROM {}", quote_identifier(table));
        self.execute_query(&sql).await
    }

    async fn execute_query(&self, sql: &str) -> Result<ExecutionResult> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PeekError::query(format!("Failed to begin transaction: {e}")))?;

        match run_statement(&mut tx, sql).await {
            Ok(result) => {
                tx.commit()
                    .await
                    .map_err(|e| PeekError::query(format!("Commit failed: {e}")))?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback after failed read also failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    async fn execute_uncommitted(
        &self,
        sql: &str,
    ) -> Result<(ExecutionResult, Box<dyn HeldTransaction>)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PeekError::query(format!("Failed to begin transaction: {e}")))?;

        match run_statement(&mut tx, sql).await {
            Ok(result) => Ok((result, Box::new(SqliteTransaction { tx }))),
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback after failed statement also failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// An open transaction owning the pool's only connection.
struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl HeldTransaction for SqliteTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| PeekError::query(format!("Commit failed: {e}")))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| PeekError::query(format!("Rollback failed: {e}")))
    }
}

/// Runs one statement. If the prepared statement reports columns, every row
/// is fetched; otherwise the modified-row count is returned.
async fn run_statement(conn: &mut SqliteConnection, sql: &str) -> Result<ExecutionResult> {
    let columns: Vec<ColumnInfo> = {
        let statement = (&mut *conn).prepare(sql).await.map_err(format_query_error)?;
        statement
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect()
    };

    if columns.is_empty() {
        let done = sqlx::query(sql)
            .execute(&mut *conn)
            .await
            .map_err(format_query_error)?;
        return Ok(ExecutionResult::affected(done.rows_affected()));
    }

    let rows = sqlx::query(sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(format_query_error)?;

    Ok(ExecutionResult::row_set(
        columns,
        rows.iter().map(convert_row).collect(),
    ))
}

/// Keeps the database's own message; that is what the operator needs to see.
fn format_query_error(e: sqlx::Error) -> PeekError {
    match e {
        sqlx::Error::Database(db_err) => PeekError::query(db_err.message().to_string()),
        other => PeekError::query(other.to_string()),
    }
}

fn convert_row(row: &SqliteRow) -> Row {
    (0..row.len()).map(|i| convert_value(row, i)).collect()
}

/// Decodes by the value's storage class, not the declared column type.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let Ok(raw) = row.try_get_raw(index) else {
        return Value::Null;
    };
    if raw.is_null() {
        return Value::Null;
    }

    let storage = raw.type_info().name().to_string();
    let value = ValueRef::to_owned(&raw);

    match storage.as_str() {
        "INTEGER" => value.try_decode::<i64>().map(Value::Integer),
        "REAL" => value.try_decode::<f64>().map(Value::Real),
        "BLOB" => value.try_decode::<Vec<u8>>().map(Value::Blob),
        _ => value.try_decode::<String>().map(Value::Text),
    }
    .unwrap_or_else(|e| {
        warn!("Could not decode column {index} ({storage}): {e}");
        Value::Null
    })
}
