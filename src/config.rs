//! Configuration management for sqlpeek.
//!
//! Loads settings from a TOML file, then layers environment variables
//! (including a `.env` file) and CLI flags on top.

use crate::error::{PeekError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM provider configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Query classification settings.
    #[serde(default)]
    pub safety: SafetyConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider: "openai", "ollama" or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name. Empty means "provider default".
    #[serde(default)]
    pub model: String,

    /// Base URL override (only used by Ollama).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Classification strictness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SafetyConfig {
    /// Also scan the parsed statement list for data modifications.
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sqlpeek")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| PeekError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            PeekError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment overrides. `SQLPEEK_LLM_PROVIDER` replaces the
    /// configured provider; model variables are read by the provider factory.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("SQLPEEK_LLM_PROVIDER") {
            if !provider.trim().is_empty() {
                self.llm.provider = provider.trim().to_string();
            }
        }
    }
}
