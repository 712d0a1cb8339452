//! Query result types for sqlpeek.
//!
//! Defines the structures used to represent what the database hands back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of running one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionResult {
    /// The statement produced column metadata; all rows were fetched eagerly.
    RowSet {
        /// Column metadata, in select-list order.
        columns: Vec<ColumnInfo>,
        /// Rows of data.
        rows: Vec<Row>,
    },
    /// The statement returned no columns; this is the modified-row count.
    AffectedCount {
        /// Rows changed as reported by the database.
        rowcount: u64,
    },
}

impl ExecutionResult {
    /// Creates a row set from column names and rows.
    pub fn row_set(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        Self::RowSet { columns, rows }
    }

    /// Creates an affected-row count.
    pub fn affected(rowcount: u64) -> Self {
        Self::AffectedCount { rowcount }
    }

    /// Returns the number of rows returned or affected.
    pub fn row_count(&self) -> u64 {
        match self {
            Self::RowSet { rows, .. } => rows.len() as u64,
            Self::AffectedCount { rowcount } => *rowcount,
        }
    }

    /// Returns the column names of a row set (empty for affected counts).
    pub fn column_names(&self) -> Vec<&str> {
        match self {
            Self::RowSet { columns, .. } => columns.iter().map(|c| c.name.as_str()).collect(),
            Self::AffectedCount { .. } => Vec::new(),
        }
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Declared or reported column type (may be empty for expressions).
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// One cell, tagged with its SQLite storage class.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Shown by size only.
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numbers and text map to their JSON counterparts. Blobs and non-finite
    /// reals become their display text.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Null => Json::Null,
            Self::Integer(i) => Json::from(*i),
            Self::Real(r) => serde_json::Number::from_f64(*r)
                .map(Json::Number)
                .unwrap_or_else(|| Json::String(r.to_string())),
            Self::Text(t) => Json::String(t.clone()),
            Self::Blob(_) => Json::String(self.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(t) => f.write_str(t),
            Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
