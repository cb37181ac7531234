//! Command-line interface for Phonix

use clap::Parser;
use std::process;
use tracing::{error, info, Level};

mod cli;
mod commands;
mod config;
mod output;
mod wordbank;

use cli::*;
use config::PhonixctlConfig;

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match PhonixctlConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Override config with CLI args
    let config = config.with_overrides(&args);

    info!(
        "Starting phonixctl with model {} at {}",
        config.model.as_deref().unwrap_or("(connector default)"),
        config.api_base.as_deref().unwrap_or("(connector default)")
    );

    // Execute command
    let result = match args.command {
        Commands::Generate { source, prompt, max_retries } => {
            commands::generate::handle_generate_command(source, prompt, max_retries, &config).await
        }
        Commands::Regenerate {
            source,
            prompt,
            set_title,
            set_description,
            max_retries,
        } => {
            commands::generate::handle_regenerate_command(
                source,
                prompt,
                set_title,
                set_description,
                max_retries,
                &config,
            )
            .await
        }
        Commands::Prompt {
            source,
            set_title,
            set_description,
        } => commands::prompt::handle_prompt_command(source, set_title, set_description),
        Commands::Words { source } => commands::words::handle_words_command(source, &config),
    };

    match result {
        Ok(_) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}
