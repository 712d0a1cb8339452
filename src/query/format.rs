//! Result formatting for the output pane.
//!
//! Row sets become pretty-printed JSON (an array of column → value objects,
//! columns in select-list order). Schema listings are the exception: their
//! `sql` column is printed raw so `CREATE` statements read as source.

use crate::db::{ColumnInfo, ExecutionResult, Row};

/// Column that carries schema-definition text.
const SCHEMA_SQL_COLUMN: &str = "sql";

/// Renders an execution result under a `label` (the query or request text).
pub fn format_result(result: &ExecutionResult, label: &str) -> String {
    match result {
        ExecutionResult::AffectedCount { rowcount } => format!(
            "SQL Query:\n{label}\n\n✓ Query executed successfully\n{rowcount} row(s) affected"
        ),
        ExecutionResult::RowSet { columns, rows } => {
            let mut text = format!("SQL Query:\n{label}\n\nReturned {} row(s)\n\n", rows.len());
            text.push_str(&format_rows(columns, rows));
            text
        }
    }
}

/// Renders just the body of a row set: "No results", raw schema text, or JSON.
pub fn format_rows(columns: &[ColumnInfo], rows: &[Row]) -> String {
    if rows.is_empty() {
        return "No results".to_string();
    }
    if is_schema_listing(columns) {
        format_schema_rows(columns, rows)
    } else {
        format_json_rows(columns, rows)
    }
}

/// A result is a schema listing when it has a `sql` column and at most two columns.
pub fn is_schema_listing(columns: &[ColumnInfo]) -> bool {
    columns.len() <= 2 && columns.iter().any(|c| c.name == SCHEMA_SQL_COLUMN)
}

fn format_schema_rows(columns: &[ColumnInfo], rows: &[Row]) -> String {
    let mut text = String::new();
    for row in rows {
        for (column, value) in columns.iter().zip(row) {
            if value.is_null() {
                continue;
            }
            if column.name == SCHEMA_SQL_COLUMN {
                text.push_str(&format!("{value}\n\n"));
            } else {
                text.push_str(&format!("{}: {value}\n", column.name));
            }
        }
    }
    text
}

fn format_json_rows(columns: &[ColumnInfo], rows: &[Row]) -> String {
    let objects: Vec<serde_json::Value> =
        rows.iter().map(|row| row_to_json(columns, row)).collect();
    serde_json::to_string_pretty(&objects)
        .unwrap_or_else(|e| format!("<unprintable rows: {e}>"))
}

/// Maps one row to a JSON object keyed by column name.
pub fn row_to_json(columns: &[ColumnInfo], row: &Row) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    for (column, value) in columns.iter().zip(row) {
        object.insert(column.name.clone(), value.to_json());
    }
    serde_json::Value::Object(object)
}
