//! Local Ollama provider; makes assisted mode usable without an API key.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{PeekError, Result};
use crate::llm::http::{self, Attempt, RetryPolicy};
use crate::llm::types::Message;
use crate::llm::LlmClient;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:3b";

/// Local models can be slow to load on first use.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const UNREACHABLE: &str = "Failed to connect to Ollama. Is it running? Try: ollama serve";

/// Where the server lives and which model to ask.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_MODEL)
    }
}

/// Non-streaming client for `/api/chat`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    config: OllamaConfig,
    http: Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let http = http::build_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    async fn chat(&self, body: &ChatRequest<'_>) -> std::result::Result<String, Attempt> {
        let response = self
            .http
            .post(self.config.endpoint("chat"))
            .json(body)
            .send()
            .await
            .map_err(|e| Attempt::from_transport(e, UNREACHABLE))?;

        let (status, text) = http::read_body(response).await?;
        if !status.is_success() {
            return Err(Attempt::fatal(PeekError::translation(format!(
                "Ollama API error ({}): {}",
                status, text
            ))));
        }
        let reply: ChatResponse = http::decode(&text)?;
        Ok(reply.message.content)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };
        RetryPolicy::once().run("ollama", || self.chat(&body)).await
    }

    /// Listing installed models proves the server is up without generating anything.
    async fn health_check(&self) -> Result<()> {
        let response = self
            .http
            .get(self.config.endpoint("tags"))
            .send()
            .await
            .map_err(|e| {
                PeekError::config(Attempt::from_transport(e, UNREACHABLE).error.message())
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PeekError::config(format!(
                "Ollama health check failed ({})",
                status
            )))
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Message,
}
