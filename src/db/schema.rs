//! Database schema types for sqlpeek.

use serde::{Deserialize, Serialize};

/// Header line of the schema text handed to the translator.
pub const SCHEMA_HEADER: &str = "Database Schema:\n\n";

/// The user tables of the open database.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    /// Tables ordered by name.
    pub tables: Vec<Table>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenates every table's creation statement, separated by blank lines.
    pub fn describe(&self) -> String {
        let mut text = String::from(SCHEMA_HEADER);
        for table in &self.tables {
            text.push_str(&table.create_sql);
            text.push_str("\n\n");
        }
        text
    }

    /// Returns the table summaries used by the table-list grid.
    pub fn summaries(&self) -> Vec<TableSummary> {
        self.tables
            .iter()
            .map(|t| TableSummary {
                name: t.name.clone(),
                row_count: t.row_count,
            })
            .collect()
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// One user table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Number of rows at introspection time.
    pub row_count: i64,
    /// Column names in declaration order.
    pub columns: Vec<String>,
    /// The `CREATE TABLE` statement as stored in `sqlite_master`.
    pub create_sql: String,
}

/// Name and row count, as shown in the table list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub row_count: i64,
}

/// Quotes an identifier for interpolation into SQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
