//! Configuration for the OpenAI-compatible connector

use phonix_core::errors::GenerationError;
use serde::{Deserialize, Serialize};

/// Environment variable holding the bearer token
pub const API_KEY_ENV: &str = "PHONIX_API_KEY";
/// Environment variable overriding the model name
pub const MODEL_ENV: &str = "PHONIX_MODEL";
/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "PHONIX_API_BASE";

/// Chat completions API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Bearer API key
    pub api_key: String,
    /// Model identifier sent with every request
    pub model: String,
    /// API base URL, without the `/chat/completions` suffix
    pub api_base: String,
    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl OpenAiConfig {
    /// Create a new config with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            timeout_ms: 60_000,
            connect_timeout_ms: 30_000,
        }
    }

    /// Build a config from `PHONIX_API_KEY`, `PHONIX_MODEL` and `PHONIX_API_BASE`
    pub fn from_env() -> Result<Self, GenerationError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::Configuration(format!("{} environment variable not set", API_KEY_ENV))
            })?;

        Ok(Self::new(api_key).with_env_overrides())
    }

    /// Apply `PHONIX_MODEL` and `PHONIX_API_BASE` when they are set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var(MODEL_ENV) {
            self.model = model;
        }
        if let Ok(api_base) = std::env::var(API_BASE_ENV) {
            self.api_base = api_base;
        }
        self
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL (for any OpenAI-compatible service)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set connect timeout
    pub fn with_connect_timeout(mut self, connect_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }

    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self::new("") // Empty API key - must be set by user
    }
}
