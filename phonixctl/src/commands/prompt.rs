//! Prompt preview command

use crate::cli::WordSource;
use crate::wordbank::load_word_bank;
use phonix_core::errors::CoreResult;
use phonix_core::prompt::PromptBuilder;
use phonix_core::types::WordCandidate;

/// Handle the `prompt` command. Never contacts the generation service.
pub fn handle_prompt_command(
    source: WordSource,
    set_title: Option<String>,
    set_description: String,
) -> CoreResult<()> {
    let words = load_word_bank(&source.words, source.delimiter)?;
    println!("{}", render_prompt(&words, set_title.as_deref(), &set_description));
    Ok(())
}

/// Generation prompt, or the regeneration prompt when a set title is given
fn render_prompt(words: &[WordCandidate], set_title: Option<&str>, set_description: &str) -> String {
    let builder = PromptBuilder::default();
    match set_title {
        Some(title) => builder.build_regeneration_prompt(words, title, set_description),
        None => builder.build_generation_prompt(words),
    }
}
