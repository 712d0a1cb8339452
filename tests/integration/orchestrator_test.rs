//! End-to-end flows through the orchestrator with a real database file.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sqlpeek::app::{Mode, Orchestrator, Session, Severity};
use sqlpeek::db::DatabaseClient;
use sqlpeek::llm::{LlmTranslator, MockLlmClient};
use sqlpeek::query::GateState;
use sqlpeek::safety::Classifier;

use super::support::{user_name, TestDatabase};

fn orchestrator(db: Arc<dyn DatabaseClient>) -> Orchestrator {
    let translator = LlmTranslator::new(Box::new(MockLlmClient::new()));
    Orchestrator::new(db, Classifier::lexical()).with_translator(Arc::new(translator))
}

fn assisted_session() -> Session {
    let mut session = Session::new();
    assert_eq!(session.toggle_mode(), Mode::Assisted);
    session
}

#[tokio::test]
async fn test_direct_select_formats_json() {
    let fixture = TestDatabase::new().await;
    let db: Arc<dyn DatabaseClient> = Arc::new(fixture.open().await);
    let orchestrator = orchestrator(db);
    let mut session = Session::new();

    let payload = orchestrator
        .handle_input(&mut session, "SELECT id, name FROM users ORDER BY id")
        .await
        .unwrap();

    assert_eq!(
        payload.body,
        "SQL Query:\nSELECT id, name FROM users ORDER BY id\n\nReturned 2 row(s)\n\n\
[\n  {\n    \"id\": 1,\n    \"name\": \"Alice\"\n  },\n  {\n    \"id\": 2,\n    \"name\": \"Bob\"\n  }\n]"
    );
    assert!(!payload.awaiting_confirmation);
    assert_eq!(session.gate_state(), GateState::Idle);
    orchestrator.shutdown(&mut session).await.unwrap();
}

#[tokio::test]
async fn test_direct_update_confirmed() {
    let fixture = TestDatabase::new().await;
    let db: Arc<dyn DatabaseClient> = Arc::new(fixture.open().await);
    let orchestrator = orchestrator(db);
    let mut session = Session::new();

    let payload = orchestrator
        .handle_input(&mut session, "UPDATE users SET name = 'X' WHERE id = 1")
        .await
        .unwrap();
    assert!(payload.awaiting_confirmation);
    assert!(session.is_pending());

    let payload = orchestrator.confirm(&mut session).await.unwrap();
    assert_eq!(
        payload.body,
        "SQL Query:\nUPDATE users SET name = 'X' WHERE id = 1\n\n✓ Changes committed\n1 row(s) affected"
    );
    assert_eq!(
        payload.notification.map(|n| n.severity),
        Some(Severity::Information)
    );
    orchestrator.shutdown(&mut session).await.unwrap();

    let reader = fixture.reader().await;
    assert_eq!(user_name(&reader, 1).await.as_deref(), Some("X"));
}

#[tokio::test]
async fn test_input_refused_until_decision() {
    let fixture = TestDatabase::new().await;
    let db: Arc<dyn DatabaseClient> = Arc::new(fixture.open().await);
    let orchestrator = orchestrator(db);
    let mut session = Session::new();

    orchestrator
        .handle_input(&mut session, "DELETE FROM users WHERE id = 2")
        .await
        .unwrap();

    let refused = orchestrator
        .handle_input(&mut session, "SELECT * FROM users")
        .await
        .unwrap();
    assert!(refused.awaiting_confirmation);
    assert!(orchestrator.tables(&mut session).await.is_err());

    let payload = orchestrator.cancel(&mut session).await.unwrap();
    assert!(payload.body.contains("✗ Changes rolled back"));

    let tables = orchestrator.tables(&mut session).await.unwrap();
    let users = tables.iter().find(|t| t.name == "users").unwrap();
    assert_eq!(users.row_count, 2);
    orchestrator.shutdown(&mut session).await.unwrap();
}

#[tokio::test]
async fn test_assisted_read_reports_generated_sql() {
    let fixture = TestDatabase::new().await;
    let db: Arc<dyn DatabaseClient> = Arc::new(fixture.open().await);
    let orchestrator = orchestrator(db);
    let mut session = assisted_session();

    let payload = orchestrator
        .handle_input(&mut session, "show all users")
        .await
        .unwrap();

    assert_eq!(payload.generated_sql.as_deref(), Some("SELECT * FROM users;"));
    assert!(payload
        .body
        .starts_with("SQL Query:\nshow all users\n\nReturned 2 row(s)"));
    orchestrator.shutdown(&mut session).await.unwrap();
}

#[tokio::test]
async fn test_assisted_delete_is_gated_and_rolled_back_on_shutdown() {
    let fixture = TestDatabase::new().await;
    let db: Arc<dyn DatabaseClient> = Arc::new(fixture.open().await);
    let orchestrator = orchestrator(db);
    let mut session = assisted_session();

    let payload = orchestrator
        .handle_input(&mut session, "delete user 1")
        .await
        .unwrap();
    assert_eq!(
        payload.generated_sql.as_deref(),
        Some("DELETE FROM users WHERE id = 1;")
    );
    assert!(payload.awaiting_confirmation);

    orchestrator.shutdown(&mut session).await.unwrap();

    let reader = fixture.reader().await;
    assert_eq!(user_name(&reader, 1).await.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_schema_listing_through_translator() {
    let fixture = TestDatabase::new().await;
    let db: Arc<dyn DatabaseClient> = Arc::new(fixture.open().await);
    let orchestrator = orchestrator(db);
    let mut session = assisted_session();

    let payload = orchestrator
        .handle_input(&mut session, "what tables are there")
        .await
        .unwrap();

    let users_ddl = "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT)";
    assert!(payload.body.contains(&format!("{users_ddl}\n\n")));
    assert!(!payload.body.contains('{'));
    orchestrator.shutdown(&mut session).await.unwrap();
}

#[tokio::test]
async fn test_query_error_is_reported() {
    let fixture = TestDatabase::new().await;
    let db: Arc<dyn DatabaseClient> = Arc::new(fixture.open().await);
    let orchestrator = orchestrator(db);
    let mut session = Session::new();

    let payload = orchestrator
        .handle_input(&mut session, "SELECT * FROM nope")
        .await
        .unwrap();

    assert_eq!(payload.body, "SQL Error:\n\nno such table: nope");
    assert_eq!(
        payload.notification.map(|n| n.severity),
        Some(Severity::Error)
    );
    assert_eq!(session.gate_state(), GateState::Idle);
    orchestrator.shutdown(&mut session).await.unwrap();
}
