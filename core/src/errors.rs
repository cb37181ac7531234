//! Error types for Phonix core operations

use thiserror::Error;

/// Main error type for operations that sit around the generation pipeline
/// (word bank loading, configuration, output)
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Activity generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Word bank error: {0}")]
    WordBank(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// Errors produced by a single generation call.
///
/// The `Display` output is the human-readable message surfaced to callers;
/// [`GenerationError::is_retryable`] tells them whether the same request may
/// succeed when attempted again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed, check the API key: {0}")]
    Authentication(String),

    #[error("Billing problem with the generation account: {0}")]
    Billing(String),

    #[error("Permission denied by the generation service: {0}")]
    Permission(String),

    #[error("The generation service is rate limiting requests, please try again shortly")]
    RateLimited(String),

    #[error("The generation service is having trouble (HTTP {status}), please try again")]
    Server { status: u16, message: String },

    #[error("Generation service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Empty response from the generation service: {0}")]
    EmptyResponse(String),

    #[error("The generation service reported an error: {0}")]
    Upstream(String),

    #[error("Could not read the generated activity: {0}")]
    MalformedJson(String),

    #[error("Generated activity failed validation: {0}")]
    SchemaValidation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GenerationError {
    /// Returns true if the error is transient and the request should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_)
            | Self::Server { .. }
            | Self::EmptyResponse(_)
            | Self::Upstream(_)
            | Self::MalformedJson(_)
            | Self::SchemaValidation(_) => true,
            Self::Network(_)
            | Self::Authentication(_)
            | Self::Billing(_)
            | Self::Permission(_)
            | Self::Api { .. }
            | Self::Configuration(_) => false,
        }
    }
}

/// Result type alias for generation operations
pub type GenResult<T> = Result<T, GenerationError>;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
