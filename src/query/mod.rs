//! Query execution, confirmation gating and result formatting.
//!
//! Isolates the pieces that touch the database from the orchestrator so each
//! can be tested on its own.

pub mod executor;
pub mod format;
pub mod gate;

pub use executor::{Execution, QueryExecutor};
pub use format::{format_result, is_schema_listing};
pub use gate::{GateState, PendingChange, TransactionGate};

/// A query to run, plus the natural-language request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// The SQL text.
    pub text: String,
    /// Operator's free-text request, when the query was generated.
    pub original_request: Option<String>,
}

impl Query {
    /// A query typed directly by the operator.
    pub fn direct(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            original_request: None,
        }
    }

    /// A query produced by the translator from `request`.
    pub fn translated(text: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            original_request: Some(request.into()),
        }
    }

    /// The text to show above results: the request if there was one.
    pub fn label(&self) -> &str {
        self.original_request.as_deref().unwrap_or(&self.text)
    }
}
