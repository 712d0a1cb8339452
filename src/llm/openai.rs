//! OpenAI chat-completions provider.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PeekError, Result};
use crate::llm::http::{self, Attempt, RetryPolicy};
use crate::llm::types::Message;
use crate::llm::LlmClient;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// A single query never needs more.
const MAX_COMPLETION_TOKENS: u32 = 500;

const RETRY: RetryPolicy = RetryPolicy {
    attempts: 3,
    base_delay: Duration::from_secs(1),
};

/// Credentials and model for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Talks to the hosted completions endpoint, retrying rate limits and 5xx.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    http: Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http = http::build_client(config.timeout_secs)?;
        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn attempt(&self, body: &CompletionRequest<'_>) -> std::result::Result<String, Attempt> {
        let response = self
            .http
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                Attempt::from_transport(e, "Failed to connect to OpenAI API. Check your network.")
            })?;

        let (status, text) = http::read_body(response).await?;
        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let reply: CompletionResponse = http::decode(&text)?;
        reply
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| Attempt::fatal(PeekError::translation("No response from OpenAI")))
    }
}

/// Maps a non-success status to an error. 429 and 5xx are worth another try.
fn classify_status(status: StatusCode, body: &str) -> Attempt {
    match status {
        StatusCode::UNAUTHORIZED => Attempt::fatal(PeekError::translation(
            "Authentication failed. Check your OPENAI_API_KEY.",
        )),
        StatusCode::TOO_MANY_REQUESTS => Attempt::transient(PeekError::translation(
            "Rate limited. Please wait and try again.",
        )),
        _ => {
            let detail = serde_json::from_str::<ErrorEnvelope>(body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("({}) {}", status, body));
            let error = PeekError::translation(format!("OpenAI API error: {}", detail));
            if status.is_server_error() {
                Attempt::transient(error)
            } else {
                Attempt::fatal(error)
            }
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: 0.0,
            max_tokens: MAX_COMPLETION_TOKENS,
        };
        RETRY.run("openai", || self.attempt(&body)).await
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
