//! Word bank inspection command

use crate::cli::WordSource;
use crate::config::PhonixctlConfig;
use crate::output::display_words;
use crate::wordbank::load_word_bank;
use phonix_core::errors::CoreResult;

/// Handle the `words` command
pub fn handle_words_command(source: WordSource, config: &PhonixctlConfig) -> CoreResult<()> {
    let words = load_word_bank(&source.words, source.delimiter)?;
    display_words(&words, &config.default_format)
}
