//! Error types for sqlpeek.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for sqlpeek operations.
#[derive(Error, Debug)]
pub enum PeekError {
    /// The database rejected a query (syntax, missing object, constraint).
    #[error("Query error: {0}")]
    Query(String),

    /// The natural-language translator was unreachable or answered garbage.
    #[error("Translation error: {0}")]
    Translation(String),

    /// Configuration problems (bad config file, missing API key, failed health check).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database path handed to the bootstrap is unusable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The database file could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Internal application errors (terminal setup, closed channels, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PeekError {
    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a translation error with the given message.
    pub fn translation(msg: impl Into<String>) -> Self {
        Self::Translation(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Query(_) => "Query Error",
            Self::Translation(_) => "Translation Error",
            Self::Config(_) => "Configuration Error",
            Self::Validation(_) => "Validation Error",
            Self::Connection(_) => "Connection Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Query(m)
            | Self::Translation(m)
            | Self::Config(m)
            | Self::Validation(m)
            | Self::Connection(m)
            | Self::Internal(m) => m,
        }
    }
}

/// Result type alias using PeekError.
pub type Result<T> = std::result::Result<T, PeekError>;
