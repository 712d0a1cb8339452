//! LLM-backed translator.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::llm::{build_messages, parse_translation, LlmClient, Translation, Translator};

/// Translates requests by prompting an [`LlmClient`].
pub struct LlmTranslator {
    client: Box<dyn LlmClient>,
}

impl LlmTranslator {
    /// Wraps a provider client.
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, request: &str, schema: &str) -> Result<Translation> {
        let messages = build_messages(request, schema);
        debug!(
            request_len = request.len(),
            schema_len = schema.len(),
            "Sending translation request"
        );

        let reply = self.client.complete(&messages).await?;
        debug!(reply_len = reply.len(), "Received translation reply");

        parse_translation(&reply)
    }

    async fn health_check(&self) -> Result<()> {
        self.client.health_check().await
    }
}
