//! LLM integration for sqlpeek.
//!
//! Turns natural-language requests into SQLite queries. Providers implement
//! [`LlmClient`]; [`LlmTranslator`] wraps any of them behind the
//! [`Translator`] seam the orchestrator depends on.

pub mod factory;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod translator;
pub mod types;

pub use factory::create_client;
pub use mock::MockLlmClient;
pub use ollama::{OllamaClient, OllamaConfig};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::parse_translation;
pub use prompt::{build_messages, build_system_prompt};
pub use translator::LlmTranslator;
pub use types::{Message, Role};

use async_trait::async_trait;
use std::str::FromStr;

use crate::error::Result;

/// Reply meaning "this request does not map to a query".
pub const NO_QUERY_SENTINEL: &str = "NO_QUERY_NEEDED";

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the full reply text for `messages`.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Defaults to a throwaway completion, which also exercises credentials.
    async fn health_check(&self) -> Result<()> {
        self.complete(&[Message::user("test")]).await.map(|_| ())
    }
}

/// Outcome of translating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// A ready-to-execute query.
    Query(String),
    /// The translator answered with the sentinel.
    NoQuery,
}

/// Natural-language to SQL translation.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates `request` given the full schema text.
    async fn translate(&self, request: &str, schema: &str) -> Result<Translation>;

    /// Checks that translation is usable at all.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Which backend answers translation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Ollama,
    /// Canned replies; needs neither network nor key.
    Mock,
}

impl LlmProvider {
    const ALL: [Self; 3] = [Self::OpenAi, Self::Ollama, Self::Mock];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown LLM provider: {}", s))
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing_ignores_case() {
        assert_eq!("OpenAI".parse::<LlmProvider>(), Ok(LlmProvider::OpenAi));
        assert_eq!(" ollama ".parse::<LlmProvider>(), Ok(LlmProvider::Ollama));
        assert_eq!("mock".parse::<LlmProvider>(), Ok(LlmProvider::Mock));
        assert_eq!(
            "bedrock".parse::<LlmProvider>(),
            Err("Unknown LLM provider: bedrock".to_string())
        );
    }

    #[test]
    fn test_provider_round_trips_through_display() {
        for provider in LlmProvider::ALL {
            assert_eq!(provider.to_string().parse::<LlmProvider>(), Ok(provider));
        }
        assert_eq!(LlmProvider::default(), LlmProvider::OpenAi);
    }

    #[tokio::test]
    async fn test_mock_client_implements_trait() {
        let client: Box<dyn LlmClient> = Box::new(MockLlmClient::new());
        let messages = vec![Message::user("Show me all users")];
        let response = client.complete(&messages).await.unwrap();
        assert!(response.contains("SELECT"));
        assert!(client.health_check().await.is_ok());
    }
}
