//! Shared fixtures: a seeded database file and a second read-only view of it.

use std::path::PathBuf;

use sqlpeek::db::SqliteClient;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tempfile::TempDir;

const SEED: &[&str] = &[
    "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT)",
    "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL, total REAL)",
    "INSERT INTO users (id, name, email) VALUES (1, 'Alice', 'alice@example.com')",
    "INSERT INTO users (id, name, email) VALUES (2, 'Bob', NULL)",
    "INSERT INTO orders (id, user_id, total) VALUES (1, 1, 9.5)",
];

/// A seeded database that lives as long as the fixture.
pub struct TestDatabase {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        for statement in SEED {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        pool.close().await;

        Self { _dir: dir, path }
    }

    pub async fn open(&self) -> SqliteClient {
        SqliteClient::open(&self.path).await.unwrap()
    }

    /// A separate connection that sees only committed data.
    pub async fn reader(&self) -> SqlitePool {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true);
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap()
    }
}

/// Reads a user's name through `pool`.
pub async fn user_name(pool: &SqlitePool, id: i64) -> Option<String> {
    sqlx::query_scalar("SELECT name FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .unwrap()
}
