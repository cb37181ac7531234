//! Configuration management for phonixctl

use crate::cli::{Cli, OutputFormat};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use phonix_connector_openai::OpenAiConfig;
use phonix_core::errors::{CoreError, CoreResult};
use phonix_core::types::DEFAULT_MAX_RETRIES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for phonixctl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhonixctlConfig {
    /// Bearer API key for the chat completions endpoint
    pub api_key: Option<String>,
    /// Model identifier; falls back to `PHONIX_MODEL`, then the connector default
    pub model: Option<String>,
    /// Chat completions API base URL; falls back to `PHONIX_API_BASE`, then the connector default
    pub api_base: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff unit between retries, in milliseconds
    pub retry_base_delay_ms: u64,
    /// Default output format
    pub default_format: OutputFormat,
}

impl Default for PhonixctlConfig {
    fn default() -> Self {
        let connector = OpenAiConfig::default();
        Self {
            api_key: None,
            model: None,
            api_base: None,
            timeout_secs: connector.timeout_ms / 1000,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: 1000,
            default_format: OutputFormat::Table,
        }
    }
}

impl PhonixctlConfig {
    /// Load configuration from defaults, config files and environment
    pub fn load(config_path: &Option<PathBuf>) -> CoreResult<Self> {
        let mut figment = Figment::from(Serialized::defaults(PhonixctlConfig::default()));

        // Load from default config file if it exists
        let default_config_paths = [
            "phonixctl.yaml",
            "phonixctl.yml",
            ".phonixctl.yaml",
            ".phonixctl.yml",
        ];

        for path in &default_config_paths {
            if Path::new(path).exists() {
                figment = figment.merge(Yaml::file(path));
                break;
            }
        }

        // Load from specified config file
        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Yaml::file(path));
            } else {
                return Err(CoreError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        }

        // Load from environment variables (prefixed with PHONIXCTL_)
        figment = figment.merge(Env::prefixed("PHONIXCTL_"));

        figment
            .extract()
            .map_err(|e| CoreError::Configuration(format!("Failed to parse configuration: {}", e)))
    }

    /// Apply CLI argument overrides to the configuration
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(ref api_base) = args.api_base {
            self.api_base = Some(api_base.clone());
        }

        if let Some(ref model) = args.model {
            self.model = Some(model.clone());
        }

        if let Some(ref format) = args.format {
            self.default_format = format.clone();
        }

        self
    }

    /// Connector settings.
    ///
    /// Values set here win over `PHONIX_API_KEY`, `PHONIX_MODEL` and
    /// `PHONIX_API_BASE`, which win over the connector defaults.
    pub fn connector_config(&self) -> CoreResult<OpenAiConfig> {
        let configured_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty());

        let mut connector = match configured_key {
            Some(key) => OpenAiConfig::new(key).with_env_overrides(),
            None => OpenAiConfig::from_env().map_err(|_| {
                CoreError::Configuration(
                    "No API key configured. Set api_key in phonixctl.yaml, PHONIXCTL_API_KEY or PHONIX_API_KEY"
                        .to_string(),
                )
            })?,
        };

        if let Some(ref model) = self.model {
            connector = connector.with_model(model.clone());
        }
        if let Some(ref api_base) = self.api_base {
            connector = connector.with_api_base(api_base.clone());
        }

        Ok(connector.with_timeout(self.timeout_secs.saturating_mul(1000)))
    }

    /// Backoff unit between retries
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
