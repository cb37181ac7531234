//! Output formatting utilities for phonixctl

use crate::cli::OutputFormat;
use colored::*;
use phonix_core::errors::CoreResult;
use phonix_core::types::{GeneratedActivity, GenerationResult, WordCandidate};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Display the outcome of a generation or regeneration call
pub fn display_result(result: &GenerationResult, format: &OutputFormat) -> CoreResult<()> {
    match format {
        OutputFormat::Table => match result {
            GenerationResult::Success(activity) => display_activity_table(activity),
            GenerationResult::Error { message, retryable } => {
                println!("{} {}", "Generation failed:".red().bold(), message);
                if *retryable {
                    println!("{}", "This error is transient; trying again may succeed.".yellow());
                }
            }
        },
        OutputFormat::Json => println!("{}", to_json(result)?),
        OutputFormat::Csv => match result {
            GenerationResult::Success(activity) => print!("{}", activity_csv(activity)),
            GenerationResult::Error { message, retryable } => {
                println!("success,message,retryable");
                println!("false,{},{}", escape_csv(message), retryable);
            }
        },
    }
    Ok(())
}

fn display_activity_table(activity: &GeneratedActivity) {
    println!("{}", activity.activity_title.bold().blue());
    if !activity.activity_description.is_empty() {
        println!("{}", activity.activity_description);
    }
    println!();

    for (i, set) in activity.sets.iter().enumerate() {
        println!("{} {}", format!("Set {}:", i + 1).bold(), set.title.green());
        if !set.description.is_empty() {
            println!("{}", set.description.dimmed());
        }

        let rows: Vec<WordTableRow> = set
            .words
            .iter()
            .map(|w| WordTableRow {
                word: w.word.clone(),
                configuration: w.configuration_type.to_string(),
                letter: if w.configuration_type.uses_letter_index() {
                    hidden_letter(&w.word, w.selected_letter_index)
                } else {
                    "-".to_string()
                },
            })
            .collect();

        println!("{}", Table::new(rows));
        println!();
    }

    println!(
        "{}",
        format!("✓ {} sets, {} words", activity.sets.len(), activity.word_count())
            .green()
            .bold()
    );
}

/// Display a parsed word bank
pub fn display_words(words: &[WordCandidate], format: &OutputFormat) -> CoreResult<()> {
    match format {
        OutputFormat::Table => {
            if words.is_empty() {
                println!("No words found");
                return Ok(());
            }

            let rows: Vec<WordBankRow> = words
                .iter()
                .map(|w| WordBankRow {
                    text: w.text.clone(),
                    has_image: if w.has_image { "yes".to_string() } else { "no".to_string() },
                })
                .collect();

            println!("{}", Table::new(rows));
            let with_image = words.iter().filter(|w| w.has_image).count();
            println!("{} words, {} with a picture", words.len(), with_image);
        }
        OutputFormat::Json => println!("{}", to_json(words)?),
        OutputFormat::Csv => print!("{}", words_csv(words)),
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One CSV row per configured word
fn activity_csv(activity: &GeneratedActivity) -> String {
    let mut out = String::from(
        "activity_title,set_index,set_title,word,configuration_type,selected_letter_index\n",
    );
    for (i, set) in activity.sets.iter().enumerate() {
        for word in &set.words {
            out.push_str(&format!(
                "{},{},{},{},{},{}\n",
                escape_csv(&activity.activity_title),
                i + 1,
                escape_csv(&set.title),
                escape_csv(&word.word),
                word.configuration_type,
                word.selected_letter_index
            ));
        }
    }
    out
}

fn words_csv(words: &[WordCandidate]) -> String {
    let mut out = String::from("text,has_image\n");
    for word in words {
        out.push_str(&format!("{},{}\n", escape_csv(&word.text), word.has_image));
    }
    out
}

fn hidden_letter(word: &str, index: usize) -> String {
    match word.chars().nth(index) {
        Some(letter) => format!("{} ({})", index, letter),
        None => index.to_string(),
    }
}

/// Escape CSV field if it contains special characters
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[derive(Tabled)]
struct WordTableRow {
    #[tabled(rename = "Word")]
    word: String,
    #[tabled(rename = "Configuration")]
    configuration: String,
    #[tabled(rename = "Hidden letter")]
    letter: String,
}

#[derive(Tabled)]
struct WordBankRow {
    #[tabled(rename = "Word")]
    text: String,
    #[tabled(rename = "Picture")]
    has_image: String,
}
