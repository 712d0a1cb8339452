//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::config::LlmConfig;
use crate::error::{PeekError, Result};
use crate::llm::ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use crate::llm::openai::DEFAULT_OPENAI_MODEL;
use crate::llm::{
    LlmClient, LlmProvider, MockLlmClient, OllamaClient, OllamaConfig, OpenAiClient, OpenAiConfig,
};

/// Provider settings read from the environment.
#[derive(Debug, Clone, Default)]
pub struct ProviderEnv {
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub ollama_url: Option<String>,
    pub ollama_model: Option<String>,
}

impl ProviderEnv {
    /// Reads `OPENAI_API_KEY`, `OPENAI_MODEL`, `OLLAMA_URL` and `OLLAMA_MODEL`.
    /// Empty values count as unset.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: var("OPENAI_MODEL"),
            ollama_url: var("OLLAMA_URL"),
            ollama_model: var("OLLAMA_MODEL"),
        }
    }
}

/// Creates an LLM client for the configured provider, reading the process environment.
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    create_client_with_env(config, &ProviderEnv::from_env())
}

/// Creates an LLM client from explicit settings.
///
/// Model resolution: environment variable, then `config.model`, then the
/// provider default. A missing OpenAI key is a configuration error.
pub fn create_client_with_env(config: &LlmConfig, env: &ProviderEnv) -> Result<Box<dyn LlmClient>> {
    let provider: LlmProvider = config.provider.parse().map_err(PeekError::config)?;
    let configured_model = Some(config.model.clone()).filter(|m| !m.trim().is_empty());

    match provider {
        LlmProvider::OpenAi => {
            let key = env.openai_api_key.clone().ok_or_else(|| {
                PeekError::config("No API key configured. Set OPENAI_API_KEY.")
            })?;
            let model = env
                .openai_model
                .clone()
                .or(configured_model)
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
            let config = OpenAiConfig::new(key, model).with_timeout(config.timeout_secs);
            Ok(Box::new(OpenAiClient::new(config)?))
        }
        LlmProvider::Ollama => {
            let model = env
                .ollama_model
                .clone()
                .or(configured_model)
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
            let url = env
                .ollama_url
                .clone()
                .or_else(|| config.base_url.clone())
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            let config = OllamaConfig::new(model)
                .with_url(url)
                .with_timeout(config.timeout_secs);
            Ok(Box::new(OllamaClient::new(config)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_create_mock_client() {
        let client = create_client_with_env(&llm_config("mock"), &ProviderEnv::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_openai_without_key_fails() {
        let err = create_client_with_env(&llm_config("openai"), &ProviderEnv::default())
            .err()
            .unwrap();
        assert!(matches!(err, PeekError::Config(_)));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_create_openai_with_key() {
        let env = ProviderEnv {
            openai_api_key: Some("sk-test".to_string()),
            ..ProviderEnv::default()
        };
        assert!(create_client_with_env(&llm_config("openai"), &env).is_ok());
    }

    #[test]
    fn test_create_ollama_needs_no_key() {
        let config = LlmConfig {
            base_url: Some("http://gpu-box:11434".to_string()),
            ..llm_config("ollama")
        };
        assert!(create_client_with_env(&config, &ProviderEnv::default()).is_ok());
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let err = create_client_with_env(&llm_config("bedrock"), &ProviderEnv::default())
            .err()
            .unwrap();
        assert!(matches!(err, PeekError::Config(_)));
        assert!(err.to_string().contains("bedrock"));
    }
}
