//! Validation and correction of model-produced activities.
//!
//! The model output is parsed into a permissive raw shape first so that a
//! missing field produces a precise rejection message instead of a generic
//! decode error. The first violated rule rejects the whole response.

use crate::errors::{GenResult, GenerationError};
use crate::types::{
    ConfigurationType, GeneratedActivity, GeneratedSet, GeneratedWordConfig, WordCandidate,
    MAX_TITLE_CHARS, MIN_WORDS_PER_SET,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivity {
    activity_title: Option<String>,
    activity_description: Option<String>,
    sets: Option<Vec<RawSet>>,
}

#[derive(Debug, Deserialize)]
struct RawSet {
    title: Option<String>,
    description: Option<String>,
    words: Option<Vec<RawWord>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWord {
    word: Option<String>,
    configuration_type: Option<String>,
    selected_letter_index: Option<Value>,
}

/// Validates model output against the word bank it was generated from
pub struct ActivityValidator<'a> {
    /// word text -> has image
    lookup: HashMap<&'a str, bool>,
}

impl<'a> ActivityValidator<'a> {
    /// Build the lookup from the words offered to the model
    pub fn new(available_words: &'a [WordCandidate]) -> Self {
        let mut lookup = HashMap::with_capacity(available_words.len());
        for candidate in available_words {
            let has_image = lookup.entry(candidate.text.as_str()).or_insert(false);
            *has_image |= candidate.has_image;
        }
        Self { lookup }
    }

    /// Parse and validate a full activity
    pub fn validate(&self, json: &str) -> GenResult<GeneratedActivity> {
        self.validate_raw(parse(json)?)
    }

    /// Validate a regeneration response; only the first set is kept
    pub fn validate_single_set(&self, json: &str) -> GenResult<GeneratedActivity> {
        let mut raw = parse(json)?;
        if let Some(sets) = raw.sets.as_mut() {
            if sets.len() > 1 {
                warn!("Regeneration returned {} sets, keeping only the first", sets.len());
                sets.truncate(1);
            }
        }
        self.validate_raw(raw)
    }

    fn validate_raw(&self, raw: RawActivity) -> GenResult<GeneratedActivity> {
        let activity_title = check_title(raw.activity_title.as_deref(), "Activity title")?;

        let raw_sets = raw.sets.unwrap_or_default();
        if raw_sets.is_empty() {
            return Err(GenerationError::SchemaValidation(
                "Activity must contain at least one set".to_string(),
            ));
        }

        let sets = raw_sets
            .into_iter()
            .enumerate()
            .map(|(index, set)| self.validate_set(index + 1, set))
            .collect::<GenResult<Vec<_>>>()?;

        debug!("Validated activity '{}' with {} sets", activity_title, sets.len());

        Ok(GeneratedActivity {
            activity_title,
            activity_description: raw.activity_description.unwrap_or_default(),
            sets,
        })
    }

    fn validate_set(&self, number: usize, raw: RawSet) -> GenResult<GeneratedSet> {
        let title = check_title(raw.title.as_deref(), &format!("Set {} title", number))?;

        let raw_words = raw.words.unwrap_or_default();
        if raw_words.len() < MIN_WORDS_PER_SET {
            return Err(GenerationError::SchemaValidation(format!(
                "Set {} ('{}') must have at least {} words, got {}",
                number,
                title,
                MIN_WORDS_PER_SET,
                raw_words.len()
            )));
        }

        let words = raw_words
            .into_iter()
            .enumerate()
            .map(|(index, word)| self.validate_word(number, index + 1, word))
            .collect::<GenResult<Vec<_>>>()?;

        Ok(GeneratedSet {
            title,
            description: raw.description.unwrap_or_default(),
            words,
        })
    }

    fn validate_word(&self, set: usize, position: usize, raw: RawWord) -> GenResult<GeneratedWordConfig> {
        let word = raw.word.ok_or_else(|| {
            GenerationError::SchemaValidation(format!(
                "Set {} word {} is missing the 'word' field",
                set, position
            ))
        })?;

        let has_image = *self.lookup.get(word.as_str()).ok_or_else(|| {
            GenerationError::SchemaValidation(format!(
                "Set {} uses '{}', which is not in the word bank",
                set, word
            ))
        })?;

        let mut configuration_type = raw
            .configuration_type
            .as_deref()
            .unwrap_or_default()
            .parse::<ConfigurationType>()
            .map_err(|e| GenerationError::SchemaValidation(format!("Set {} word '{}': {}", set, word, e)))?;

        if configuration_type == ConfigurationType::NameThePicture && !has_image {
            debug!("'{}' has no image, switching name the picture to write the word", word);
            configuration_type = ConfigurationType::WriteTheWord;
        }

        let selected_letter_index = if configuration_type.uses_letter_index() {
            let length = word.chars().count();
            match raw.selected_letter_index.as_ref().map_or(Some(0), letter_index) {
                Some(index) if index >= 0 && (index as usize) < length => index as usize,
                Some(index) => {
                    return Err(GenerationError::SchemaValidation(format!(
                        "Set {} word '{}': selectedLetterIndex {} is out of range for a {}-letter word",
                        set, word, index, length
                    )));
                }
                None => {
                    return Err(GenerationError::SchemaValidation(format!(
                        "Set {} word '{}': selectedLetterIndex is not a number",
                        set, word
                    )));
                }
            }
        } else {
            0
        };

        Ok(GeneratedWordConfig {
            word,
            configuration_type,
            selected_letter_index,
        })
    }
}

fn parse(json: &str) -> GenResult<RawActivity> {
    serde_json::from_str(json)
        .map_err(|e| GenerationError::MalformedJson(format!("Failed to parse JSON: {}", e)))
}

/// Trimmed, non-blank, at most [`MAX_TITLE_CHARS`] characters
fn check_title(title: Option<&str>, what: &str) -> GenResult<String> {
    let title = title.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(GenerationError::SchemaValidation(format!("{} is missing or blank", what)));
    }
    let length = title.chars().count();
    if length > MAX_TITLE_CHARS {
        return Err(GenerationError::SchemaValidation(format!(
            "{} '{}' is {} characters, the limit is {}",
            what, title, length, MAX_TITLE_CHARS
        )));
    }
    Ok(title.to_string())
}

/// Models occasionally quote numbers
fn letter_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null => Some(0),
        _ => None,
    }
}
