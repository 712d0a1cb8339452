//! Executor and transaction gate against a real database file.

use pretty_assertions::assert_eq;
use sqlpeek::db::{DatabaseClient, ExecutionResult, Value};
use sqlpeek::error::PeekError;
use sqlpeek::query::{Execution, GateState, PendingChange, QueryExecutor, TransactionGate};
use sqlpeek::safety::{classify, QueryKind};

use super::support::{user_name, TestDatabase};

/// Runs `sql` as a mutation and parks it in `gate`.
async fn hold(db: &dyn DatabaseClient, gate: &mut TransactionGate, sql: &str) -> u64 {
    match QueryExecutor::new(db)
        .execute(sql, QueryKind::Mutating)
        .await
        .unwrap()
    {
        Execution::Held {
            result,
            transaction,
        } => {
            let rows = result.row_count();
            gate.hold(sql, rows, transaction).await.unwrap();
            rows
        }
        Execution::Completed(_) => panic!("mutation was not held"),
    }
}

#[tokio::test]
async fn test_confirm_commits_update() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;
    let mut gate = TransactionGate::new();

    let sql = "UPDATE users SET name = 'X' WHERE id = 1";
    assert_eq!(hold(&db, &mut gate, sql).await, 1);
    assert_eq!(
        gate.state(),
        GateState::PendingConfirmation(PendingChange {
            query: sql.to_string(),
            rowcount: 1,
        })
    );

    let committed = gate.confirm().await.unwrap().unwrap();
    assert_eq!(committed.rowcount, 1);
    assert_eq!(gate.state(), GateState::Idle);
    db.close().await.unwrap();

    let reader = fixture.reader().await;
    assert_eq!(user_name(&reader, 1).await.as_deref(), Some("X"));
}

#[tokio::test]
async fn test_cancel_leaves_row_unchanged() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;
    let mut gate = TransactionGate::new();

    hold(&db, &mut gate, "UPDATE users SET name = 'X' WHERE id = 1").await;
    gate.cancel().await.unwrap().unwrap();
    assert_eq!(gate.state(), GateState::Idle);

    let result = db
        .execute_query("SELECT name FROM users WHERE id = 1")
        .await
        .unwrap();
    match result {
        ExecutionResult::RowSet { rows, .. } => assert_eq!(rows, vec![vec![Value::from("Alice")]]),
        other => panic!("expected rows, got {other:?}"),
    }
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_pending_delete_is_invisible_to_other_connections() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;
    let mut gate = TransactionGate::new();

    hold(&db, &mut gate, "DELETE FROM users WHERE id = 1").await;
    assert!(gate.is_pending());

    let reader = fixture.reader().await;
    assert_eq!(user_name(&reader, 1).await.as_deref(), Some("Alice"));
    reader.close().await;

    gate.cancel().await.unwrap().unwrap();
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_select_never_reaches_the_gate() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;

    let sql = "SELECT * FROM users";
    assert_eq!(classify(sql), QueryKind::Read);
    let execution = QueryExecutor::new(&db).execute(sql, classify(sql)).await.unwrap();
    match execution {
        Execution::Completed(result) => assert_eq!(result.row_count(), 2),
        Execution::Held { .. } => panic!("read was held"),
    }
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_confirm_and_cancel_are_noops_when_idle() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;
    let mut gate = TransactionGate::new();

    hold(&db, &mut gate, "INSERT INTO users (name) VALUES ('Carol')").await;
    assert!(gate.confirm().await.unwrap().is_ok());
    assert!(gate.confirm().await.is_none());
    assert!(gate.cancel().await.is_none());
    assert_eq!(gate.state(), GateState::Idle);

    let count = db.execute_query("SELECT COUNT(*) FROM users").await.unwrap();
    assert_eq!(count.row_count(), 1);
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_failed_mutation_leaves_nothing_held() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;

    let err = QueryExecutor::new(&db)
        .execute("UPDATE missing_table SET x = 1", QueryKind::Mutating)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no such table"));

    // The pool's only connection must be free again.
    let result = db.execute_query("SELECT COUNT(*) FROM users").await.unwrap();
    assert_eq!(result.row_count(), 1);
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_begin_is_refused_and_later_update_is_still_held() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;
    let mut gate = TransactionGate::new();

    for sql in ["BEGIN", "SAVEPOINT sp1", "SELECT 1; COMMIT"] {
        let err = QueryExecutor::new(&db)
            .execute(sql, classify(sql))
            .await
            .unwrap_err();
        assert!(matches!(err, PeekError::Query(_)), "{sql}");
    }

    let sql = "UPDATE users SET name = 'X' WHERE id = 1";
    assert_eq!(hold(&db, &mut gate, sql).await, 1);
    assert!(gate.is_pending());
    gate.cancel().await.unwrap().unwrap();
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_nested_begin_on_read_path_leaves_connection_clean() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;
    let mut gate = TransactionGate::new();

    let err = db.execute_query("BEGIN").await.unwrap_err();
    assert!(err.to_string().contains("transaction"));

    hold(&db, &mut gate, "DELETE FROM users WHERE id = 2").await;
    assert!(gate.is_pending());
    gate.confirm().await.unwrap().unwrap();
    db.close().await.unwrap();

    let reader = fixture.reader().await;
    assert_eq!(user_name(&reader, 2).await, None);
}

#[tokio::test]
async fn test_writing_read_is_committed_immediately() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;

    let sql = "REPLACE INTO users (id, name) VALUES (2, 'R')";
    assert_eq!(classify(sql), QueryKind::Read);
    let execution = QueryExecutor::new(&db).execute(sql, classify(sql)).await.unwrap();
    assert!(matches!(execution, Execution::Completed(_)));

    let reader = fixture.reader().await;
    assert_eq!(user_name(&reader, 2).await.as_deref(), Some("R"));
    reader.close().await;
    db.close().await.unwrap();
}

#[tokio::test]
async fn test_constraint_violation_leaves_nothing_held() {
    let fixture = TestDatabase::new().await;
    let db = fixture.open().await;
    let mut gate = TransactionGate::new();

    let err = QueryExecutor::new(&db)
        .execute("INSERT INTO users (id) VALUES (9)", QueryKind::Mutating)
        .await
        .unwrap_err();
    assert!(matches!(err, PeekError::Query(_)));
    assert!(err.to_string().contains("NOT NULL constraint failed"));
    assert_eq!(gate.state(), GateState::Idle);

    // A fresh mutation can still take the connection and be held.
    hold(&db, &mut gate, "INSERT INTO users (id, name) VALUES (9, 'Ivy')").await;
    gate.confirm().await.unwrap().unwrap();
    db.close().await.unwrap();

    let reader = fixture.reader().await;
    assert_eq!(user_name(&reader, 9).await.as_deref(), Some("Ivy"));
}
