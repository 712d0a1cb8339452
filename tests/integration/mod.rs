//! Integration tests against real SQLite files.

pub mod gate_test;
pub mod orchestrator_test;
pub mod schema_test;
pub mod support;
