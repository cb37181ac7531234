//! OpenAI-compatible chat completions connector for Phonix activity generation

use async_trait::async_trait;
use phonix_core::prelude::*;
use reqwest::{Client, StatusCode};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

mod config;
mod models;

pub use config::{OpenAiConfig, API_BASE_ENV, API_KEY_ENV, MODEL_ENV};
use models::*;

/// Process-wide HTTP client, built on first use and shared by every connector
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

/// Longest slice of an error body kept in messages
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Chat completions implementation of [`TextGenerator`]
pub struct OpenAiConnector {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiConnector {
    /// Create a connector on the shared HTTP client.
    ///
    /// The shared client takes its timeouts from the first config that builds it.
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::Configuration("API key is empty".to_string()));
        }
        let client = shared_client(&config)?;
        Ok(Self { client, config })
    }

    /// Create a connector on a caller-supplied HTTP client
    pub fn with_client(config: OpenAiConfig, client: Client) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(request.system.as_str()),
                ChatMessage::user(request.user.as_str()),
            ],
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
            top_p: request.sampling.top_p,
            response_format: ResponseFormat::json_object(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiConnector {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        debug!("Starting chat completion with model {}", self.config.model);
        let start_time = Instant::now();

        let body = self.build_request(request);

        let response = self
            .client
            .post(self.config.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let err = classify_status(status, &text);
            error!(
                "Chat completion returned HTTP {} after {}ms (retryable: {})",
                status.as_u16(),
                start_time.elapsed().as_millis(),
                err.is_retryable()
            );
            return Err(err);
        }

        let content = parse_completion(&text)?;

        info!(
            "Chat completion with model {} finished in {}ms, {} chars",
            self.config.model,
            start_time.elapsed().as_millis(),
            content.len()
        );

        Ok(content)
    }

    fn provider(&self) -> &str {
        "openai"
    }
}

fn shared_client(config: &OpenAiConfig) -> Result<Client, GenerationError> {
    if let Some(client) = SHARED_CLIENT.get() {
        return Ok(client.clone());
    }

    let client = Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .build()
        .map_err(|e| GenerationError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

    // a concurrent first call may have won the race; either client is fine
    Ok(SHARED_CLIENT.get_or_init(|| client).clone())
}

/// Map a non-2xx status to the error taxonomy
fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| e.error.describe())
        .unwrap_or_else(|_| truncate(body));

    match status {
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited(message),
        StatusCode::UNAUTHORIZED => GenerationError::Authentication(message),
        StatusCode::PAYMENT_REQUIRED => GenerationError::Billing(message),
        StatusCode::FORBIDDEN => GenerationError::Permission(message),
        s if s.is_server_error() => GenerationError::Server {
            status: s.as_u16(),
            message,
        },
        s => GenerationError::Api {
            status: s.as_u16(),
            body: truncate(body),
        },
    }
}

/// Pull the generated text out of a 2xx body
fn parse_completion(body: &str) -> Result<String, GenerationError> {
    if body.trim().is_empty() {
        return Err(GenerationError::EmptyResponse("Response body was empty".to_string()));
    }

    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedJson(format!("Failed to parse response: {}", e)))?;

    if let Some(err) = &response.error {
        warn!("Provider reported an error in a successful response: {}", err.describe());
        return Err(GenerationError::Upstream(err.describe()));
    }

    if let Some(usage) = &response.usage {
        debug!(
            "Token usage for {}: prompt {}, completion {}, total {}",
            response.model.as_deref().unwrap_or("unknown model"),
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }

    if let Some(reason) = response.choices.first().and_then(|c| c.finish_reason.as_deref()) {
        if reason == "length" {
            warn!("Completion stopped at the token limit; JSON may be truncated");
        }
    }

    response
        .first_content()
        .map(str::to_string)
        .ok_or_else(|| GenerationError::EmptyResponse("No generated text in response".to_string()))
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        format!("{}…", body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>())
    }
}
