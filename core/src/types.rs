//! Core data types for Phonix

use crate::errors::GenerationError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Maximum length, in characters, of activity and set titles
pub const MAX_TITLE_CHARS: usize = 30;

/// Hard floor on the number of words in a generated set
pub const MIN_WORDS_PER_SET: usize = 3;

/// Word counts suggested to the model; not enforced on responses
pub const SUGGESTED_MIN_WORDS_PER_SET: usize = 5;
pub const SUGGESTED_MAX_WORDS_PER_SET: usize = 8;

/// Retries performed after the first attempt unless the caller says otherwise
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// A word from the teacher's word bank that the model may choose from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCandidate {
    /// The word exactly as stored in the word bank
    pub text: String,
    /// Whether a picture exists for this word
    #[serde(default)]
    pub has_image: bool,
}

impl WordCandidate {
    /// Create a new word candidate
    pub fn new(text: impl Into<String>, has_image: bool) -> Self {
        Self {
            text: text.into(),
            has_image,
        }
    }
}

/// Exercise mode assigned to a word within a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigurationType {
    #[serde(rename = "fill in the blanks")]
    FillInTheBlanks,
    #[serde(rename = "name the picture")]
    NameThePicture,
    #[serde(rename = "write the word")]
    WriteTheWord,
}

impl ConfigurationType {
    /// All known configuration types, in prompt order
    pub const ALL: [ConfigurationType; 3] = [
        ConfigurationType::FillInTheBlanks,
        ConfigurationType::NameThePicture,
        ConfigurationType::WriteTheWord,
    ];

    /// Wire name used in prompts and model responses
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigurationType::FillInTheBlanks => "fill in the blanks",
            ConfigurationType::NameThePicture => "name the picture",
            ConfigurationType::WriteTheWord => "write the word",
        }
    }

    /// Whether `selected_letter_index` carries meaning for this type
    pub fn uses_letter_index(&self) -> bool {
        matches!(self, ConfigurationType::FillInTheBlanks)
    }
}

impl fmt::Display for ConfigurationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigurationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ConfigurationType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Unknown configuration type: '{}'", s))
    }
}

/// A word placed in a set together with its exercise mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWordConfig {
    pub word: String,
    pub configuration_type: ConfigurationType,
    /// Letter hidden for fill-in-the-blanks; 0 for every other type
    pub selected_letter_index: usize,
}

/// A named, ordered group of configured words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSet {
    pub title: String,
    pub description: String,
    pub words: Vec<GeneratedWordConfig>,
}

/// A validated activity ready to be persisted by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedActivity {
    pub activity_title: String,
    pub activity_description: String,
    pub sets: Vec<GeneratedSet>,
}

impl GeneratedActivity {
    /// Total number of configured words across all sets
    pub fn word_count(&self) -> usize {
        self.sets.iter().map(|s| s.words.len()).sum()
    }
}

/// Request for a full activity generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Teacher's natural-language instruction
    pub prompt: String,
    /// Words the model may use
    pub available_words: Vec<WordCandidate>,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl GenerationRequest {
    /// Create a request with the default retry budget
    pub fn new(prompt: impl Into<String>, available_words: Vec<WordCandidate>) -> Self {
        Self {
            prompt: prompt.into(),
            available_words,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the number of retries after the first attempt
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Request to regenerate a single set with a different word mix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerationRequest {
    pub prompt: String,
    pub available_words: Vec<WordCandidate>,
    pub current_set_title: String,
    pub current_set_description: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl RegenerationRequest {
    /// Create a regeneration request with the default retry budget
    pub fn new(
        prompt: impl Into<String>,
        available_words: Vec<WordCandidate>,
        current_set_title: impl Into<String>,
        current_set_description: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            available_words,
            current_set_title: current_set_title.into(),
            current_set_description: current_set_description.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the number of retries after the first attempt
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Sampling parameters sent with a completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl SamplingParams {
    /// Parameters for a full activity generation
    pub fn generation() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            top_p: 0.95,
        }
    }

    /// Parameters for single-set regeneration; a higher temperature favours variety
    pub fn regeneration() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 1024,
            top_p: 0.95,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::generation()
    }
}

/// A single system + user exchange handed to a [`crate::traits::TextGenerator`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instruction built by the prompt builder
    pub system: String,
    /// The teacher's own words
    pub user: String,
    pub sampling: SamplingParams,
}

/// Flat result shape exposed to callers that do not want a `Result`.
///
/// Serializes as `{"success": true, "activity": ...}` or
/// `{"success": false, "message": ..., "retryable": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Success(GeneratedActivity),
    Error { message: String, retryable: bool },
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success(_))
    }
}

impl From<Result<GeneratedActivity, GenerationError>> for GenerationResult {
    fn from(result: Result<GeneratedActivity, GenerationError>) -> Self {
        match result {
            Ok(activity) => GenerationResult::Success(activity),
            Err(e) => GenerationResult::Error {
                message: e.to_string(),
                retryable: e.is_retryable(),
            },
        }
    }
}

impl Serialize for GenerationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GenerationResult::Success(activity) => {
                let mut state = serializer.serialize_struct("GenerationResult", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("activity", activity)?;
                state.end()
            }
            GenerationResult::Error { message, retryable } => {
                let mut state = serializer.serialize_struct("GenerationResult", 3)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("message", message)?;
                state.serialize_field("retryable", retryable)?;
                state.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_configuration_type_parsing() {
        assert_eq!(
            "fill in the blanks".parse::<ConfigurationType>().unwrap(),
            ConfigurationType::FillInTheBlanks
        );
        assert_eq!(
            "  Name The Picture ".parse::<ConfigurationType>().unwrap(),
            ConfigurationType::NameThePicture
        );
        assert!("air writing".parse::<ConfigurationType>().is_err());
    }

    #[test]
    fn test_activity_serializes_camel_case() {
        let activity = GeneratedActivity {
            activity_title: "Farm".to_string(),
            activity_description: "Animals".to_string(),
            sets: vec![GeneratedSet {
                title: "Set".to_string(),
                description: String::new(),
                words: vec![GeneratedWordConfig {
                    word: "cat".to_string(),
                    configuration_type: ConfigurationType::WriteTheWord,
                    selected_letter_index: 0,
                }],
            }],
        };

        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["activityTitle"], "Farm");
        assert_eq!(value["sets"][0]["words"][0]["configurationType"], "write the word");
        assert_eq!(value["sets"][0]["words"][0]["selectedLetterIndex"], 0);
    }

    #[test]
    fn test_generation_result_shape() {
        let failed: GenerationResult =
            Err::<GeneratedActivity, _>(GenerationError::Authentication("bad key".into())).into();
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["retryable"], json!(false));
        assert!(value["message"].as_str().unwrap().contains("API key"));
        assert!(!failed.is_success());
    }

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new("animal words", vec![WordCandidate::new("cat", true)]);
        assert_eq!(request.max_retries, 2);

        let parsed: GenerationRequest = serde_json::from_value(json!({
            "prompt": "p",
            "available_words": [{"text": "dog"}]
        }))
        .unwrap();
        assert_eq!(parsed.max_retries, DEFAULT_MAX_RETRIES);
        assert!(!parsed.available_words[0].has_image);
    }

    #[test]
    fn test_sampling_presets() {
        let gen = SamplingParams::generation();
        let regen = SamplingParams::regeneration();
        assert_eq!(gen.max_tokens, 2048);
        assert_eq!(regen.max_tokens, 1024);
        assert!(regen.temperature > gen.temperature);
        assert_eq!(gen.top_p, regen.top_p);
    }
}
