//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "phonixctl")]
#[command(about = "Phonix phonics activity generator")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat completions API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a full activity from the word bank
    Generate {
        #[command(flatten)]
        source: WordSource,
        /// What the activity should practise
        #[arg(short, long)]
        prompt: String,
        /// Retries after the first attempt
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Regenerate one set with a different word mix
    Regenerate {
        #[command(flatten)]
        source: WordSource,
        /// What the activity should practise
        #[arg(short, long)]
        prompt: String,
        /// Title of the set being replaced
        #[arg(long)]
        set_title: String,
        /// Description of the set being replaced
        #[arg(long, default_value = "")]
        set_description: String,
        /// Retries after the first attempt
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Print the system prompt that would be sent, without calling the API
    Prompt {
        #[command(flatten)]
        source: WordSource,
        /// Preview the regeneration prompt for this set title
        #[arg(long)]
        set_title: Option<String>,
        /// Description of the set being replaced
        #[arg(long, default_value = "")]
        set_description: String,
    },
    /// Show the parsed word bank
    Words {
        #[command(flatten)]
        source: WordSource,
    },
}

/// Where the word bank comes from
#[derive(Args, Clone, Debug)]
pub struct WordSource {
    /// Word bank CSV file (columns: text, has_image)
    #[arg(short, long)]
    pub words: PathBuf,
    /// CSV delimiter
    #[arg(short, long, default_value = ",")]
    pub delimiter: char,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "phonixctl", "-f", "json", "generate", "--words", "words.csv", "--prompt", "animal words",
            "--max-retries", "1",
        ])
        .unwrap();

        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Generate { source, prompt, max_retries } => {
                assert_eq!(source.words, PathBuf::from("words.csv"));
                assert_eq!(source.delimiter, ',');
                assert_eq!(prompt, "animal words");
                assert_eq!(max_retries, Some(1));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_regenerate_requires_set_title() {
        let result = Cli::try_parse_from([
            "phonixctl", "regenerate", "--words", "words.csv", "--prompt", "animal words",
        ]);
        assert!(result.is_err());
    }
}
