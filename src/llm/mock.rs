//! Offline [`LlmClient`] with canned SQL for a `users` table.
//!
//! Backs `--llm mock` and the translator tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{PeekError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::{LlmClient, NO_QUERY_SENTINEL};

/// A reply is chosen when every group has at least one word in the request.
struct Rule {
    groups: &'static [&'static [&'static str]],
    reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        groups: &[&["all users", "show users"]],
        reply: "SELECT * FROM users;",
    },
    Rule {
        groups: &[&["count"], &["users"]],
        reply: "SELECT COUNT(*) FROM users;",
    },
    Rule {
        groups: &[&["tables", "schema"]],
        reply: "```sql\nSELECT type, sql FROM sqlite_master WHERE type = 'table';\n```",
    },
    Rule {
        groups: &[&["insert", "add"], &["user"]],
        reply: "INSERT INTO users (name) VALUES ('Test User');",
    },
    Rule {
        groups: &[&["rename", "update"], &["user 1"]],
        reply: "UPDATE users SET name = 'Updated Name' WHERE id = 1;",
    },
    Rule {
        groups: &[&["delete"], &["user 1"]],
        reply: "DELETE FROM users WHERE id = 1;",
    },
];

impl Rule {
    fn matches(&self, request: &str) -> bool {
        self.groups
            .iter()
            .all(|words| words.iter().any(|word| request.contains(word)))
    }
}

/// Clones share the call counter.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    /// Checked before the built-in rules, as (substring, reply).
    overrides: Vec<(String, String)>,
    /// Every call fails with this message when set.
    failure: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `reply` to any request containing `pattern` (case-insensitive).
    pub fn with_response(mut self, pattern: impl Into<String>, reply: impl Into<String>) -> Self {
        self.overrides
            .push((pattern.into().to_lowercase(), reply.into()));
        self
    }

    /// Behaves like an unreachable provider.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self, request: &str) -> String {
        let request = request.to_lowercase();
        self.overrides
            .iter()
            .find(|(pattern, _)| request.contains(pattern.as_str()))
            .map(|(_, reply)| reply.as_str())
            .or_else(|| {
                RULES
                    .iter()
                    .find(|rule| rule.matches(&request))
                    .map(|rule| rule.reply)
            })
            .unwrap_or(NO_QUERY_SENTINEL)
            .to_string()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(PeekError::translation(message.clone()));
        }
        let request = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map_or("", |m| m.content.as_str());
        Ok(self.answer(request))
    }

    async fn health_check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(PeekError::config(message.clone())),
            None => Ok(()),
        }
    }
}
