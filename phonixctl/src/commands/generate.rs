//! Generation and regeneration commands

use crate::cli::WordSource;
use crate::config::PhonixctlConfig;
use crate::output::display_result;
use crate::wordbank::load_word_bank;
use phonix_connector_openai::OpenAiConnector;
use phonix_core::errors::{CoreError, CoreResult, GenResult};
use phonix_core::prelude::*;
use std::sync::Arc;
use tracing::info;

/// Handle the `generate` command
pub async fn handle_generate_command(
    source: WordSource,
    prompt: String,
    max_retries: Option<u32>,
    config: &PhonixctlConfig,
) -> CoreResult<()> {
    let words = load_word_bank(&source.words, source.delimiter)?;
    let client = build_client(config)?;

    let request = GenerationRequest::new(prompt, words)
        .with_max_retries(max_retries.unwrap_or(config.max_retries));
    info!("Generating activity from {} words", request.available_words.len());

    let result = client.generate_activity(&request).await;
    report(result, config)
}

/// Handle the `regenerate` command
pub async fn handle_regenerate_command(
    source: WordSource,
    prompt: String,
    set_title: String,
    set_description: String,
    max_retries: Option<u32>,
    config: &PhonixctlConfig,
) -> CoreResult<()> {
    let words = load_word_bank(&source.words, source.delimiter)?;
    let client = build_client(config)?;

    let request = RegenerationRequest::new(prompt, words, set_title, set_description)
        .with_max_retries(max_retries.unwrap_or(config.max_retries));
    info!("Regenerating set '{}'", request.current_set_title);

    let result = client.regenerate_set(&request).await;
    report(result, config)
}

fn build_client(config: &PhonixctlConfig) -> CoreResult<ActivityGenerationClient> {
    let connector = OpenAiConnector::new(config.connector_config()?)?;
    Ok(ActivityGenerationClient::new(Arc::new(connector))
        .with_base_delay(config.retry_base_delay()))
}

/// Print the outcome in the configured format; failures still exit non-zero
fn report(result: GenResult<GeneratedActivity>, config: &PhonixctlConfig) -> CoreResult<()> {
    let failure = result.as_ref().err().cloned();
    display_result(&GenerationResult::from(result), &config.default_format)?;

    match failure {
        Some(e) => Err(CoreError::Generation(e)),
        None => Ok(()),
    }
}
