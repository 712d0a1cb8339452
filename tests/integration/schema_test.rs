//! Schema introspection and table browsing against a real database file.

use pretty_assertions::assert_eq;
use sqlpeek::db::{validate_database_path, DatabaseClient, ExecutionResult, SqliteClient, Value};
use sqlpeek::error::PeekError;

use super::support::TestDatabase;

#[tokio::test]
async fn test_introspect_tables() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;

    let schema = db.introspect_schema().await.unwrap();
    let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["orders", "users"]);

    let users = schema.table("users").unwrap();
    assert_eq!(users.row_count, 2);
    assert_eq!(users.columns, vec!["id", "name", "email"]);
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_describe_lists_create_statements() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;

    let description = db.introspect_schema().await.unwrap().describe();
    assert_eq!(
        description,
        "Database Schema:\n\n\
CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL, total REAL)\n\n\
CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT)\n\n"
    );
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_table_data_decodes_storage_classes() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;

    let result = db.table_data("orders").await.unwrap();
    match result {
        ExecutionResult::RowSet { columns, rows } => {
            let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec!["id", "user_id", "total"]);
            assert_eq!(rows, vec![vec![Value::Integer(1), Value::Integer(1), Value::Real(9.5)]]);
        }
        other => panic!("expected rows, got {other:?}"),
    }

    let users = db.table_data("users").await.unwrap();
    match users {
        ExecutionResult::RowSet { rows, .. } => assert_eq!(rows[1][2], Value::Null),
        other => panic!("expected rows, got {other:?}"),
    }
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_open_requires_existing_db_file() {
    let fixture = TestDatabase::new().await;
    assert!(validate_database_path(&fixture.path).is_ok());

    let missing = fixture.path.with_file_name("missing.db");
    let err = validate_database_path(&missing).unwrap_err();
    assert!(matches!(err, PeekError::Validation(_)));

    let err = SqliteClient::open(&missing).await.err().unwrap();
    assert!(matches!(err, PeekError::Connection(_)));
}
