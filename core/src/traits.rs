//! Core traits defining the connector interface for Phonix

use crate::errors::GenerationError;
use crate::types::CompletionRequest;
use async_trait::async_trait;

/// Trait for text-generation backends (chat-completion style endpoints).
///
/// Implementations perform exactly one request per call and classify the
/// outcome into a [`GenerationError`]; retries live in the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one system + user exchange and return the raw generated text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;

    /// Short provider name used in logs
    fn provider(&self) -> &str {
        "unknown"
    }
}
