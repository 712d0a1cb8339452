//! sqlpeek - browse a SQLite database and run SQL or natural-language
//! requests, holding every data change until the operator confirms it.
//!
//! The binary wires these modules to a terminal UI; integration tests use
//! them directly.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod query;
pub mod safety;
pub mod tui;
