//! Activity generation: prompt, completion, extraction, validation and retry

use crate::errors::{GenResult, GenerationError};
use crate::extract::extract_json_object;
use crate::prompt::PromptBuilder;
use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY};
use crate::traits::TextGenerator;
use crate::types::{
    CompletionRequest, GeneratedActivity, GenerationRequest, RegenerationRequest, SamplingParams,
    WordCandidate,
};
use crate::validation::ActivityValidator;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Turns a teacher's request into a validated [`GeneratedActivity`].
///
/// Holds no per-call state; share one instance behind an `Arc` across callers.
#[derive(Clone)]
pub struct ActivityGenerationClient {
    generator: Arc<dyn TextGenerator>,
    prompts: PromptBuilder,
    base_delay: Duration,
}

/// Which response shape a call expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Generate,
    Regenerate,
}

impl ActivityGenerationClient {
    /// Create a client over the given text generator
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            prompts: PromptBuilder::default(),
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    /// Use a custom prompt builder
    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set the backoff unit between retries
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    /// Generate a full activity from scratch
    pub async fn generate_activity(&self, request: &GenerationRequest) -> GenResult<GeneratedActivity> {
        let completion = CompletionRequest {
            system: self.prompts.build_generation_prompt(&request.available_words),
            user: request.prompt.clone(),
            sampling: SamplingParams::generation(),
        };
        self.run(Mode::Generate, completion, &request.available_words, request.max_retries)
            .await
    }

    /// Produce a replacement for one set; the result holds exactly one set
    pub async fn regenerate_set(&self, request: &RegenerationRequest) -> GenResult<GeneratedActivity> {
        let completion = CompletionRequest {
            system: self.prompts.build_regeneration_prompt(
                &request.available_words,
                &request.current_set_title,
                &request.current_set_description,
            ),
            user: request.prompt.clone(),
            sampling: SamplingParams::regeneration(),
        };
        self.run(Mode::Regenerate, completion, &request.available_words, request.max_retries)
            .await
    }

    async fn run(
        &self,
        mode: Mode,
        completion: CompletionRequest,
        words: &[WordCandidate],
        max_retries: u32,
    ) -> GenResult<GeneratedActivity> {
        let request_id = Uuid::new_v4();
        let start_time = Instant::now();
        info!(
            "Starting {:?} request {} via {} with {} available words",
            mode,
            request_id,
            self.generator.provider(),
            words.len()
        );

        if words.is_empty() {
            return Err(GenerationError::Configuration(
                "No words available to build an activity from".to_string(),
            ));
        }

        let validator = ActivityValidator::new(words);
        let policy = RetryPolicy::new(max_retries).with_base_delay(self.base_delay);

        let result = policy
            .run(|attempt| {
                let completion = &completion;
                let validator = &validator;
                async move {
                    debug!("Request {} attempt {}", request_id, attempt + 1);
                    self.attempt(mode, completion, validator).await
                }
            })
            .await;

        match &result {
            Ok(activity) => info!(
                "Request {} completed in {}ms: '{}' with {} sets, {} words",
                request_id,
                start_time.elapsed().as_millis(),
                activity.activity_title,
                activity.sets.len(),
                activity.word_count()
            ),
            Err(e) => error!(
                "Request {} failed after {}ms (retryable: {}): {}",
                request_id,
                start_time.elapsed().as_millis(),
                e.is_retryable(),
                e
            ),
        }

        result
    }

    /// One round trip: completion, extraction, validation
    async fn attempt(
        &self,
        mode: Mode,
        completion: &CompletionRequest,
        validator: &ActivityValidator<'_>,
    ) -> GenResult<GeneratedActivity> {
        let raw = self.generator.complete(completion).await?;

        let json = extract_json_object(&raw).ok_or_else(|| {
            GenerationError::MalformedJson("No JSON object found in the model output".to_string())
        })?;

        match mode {
            Mode::Generate => validator.validate(&json),
            Mode::Regenerate => validator.validate_single_set(&json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfigurationType, GenerationResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned outcomes and records what it was asked
    struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<String, GenerationError>>>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<String, GenerationError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
            self.seen.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::EmptyResponse("script exhausted".into())))
        }

        fn provider(&self) -> &str {
            "scripted"
        }
    }

    fn animal_words() -> Vec<WordCandidate> {
        vec![
            WordCandidate::new("cat", true),
            WordCandidate::new("dog", true),
            WordCandidate::new("pig", false),
        ]
    }

    fn response(words: serde_json::Value) -> String {
        json!({
            "activityTitle": "Animal words",
            "activityDescription": "Farm and pet animals",
            "sets": [{"title": "Animals", "description": "Three animals", "words": words}]
        })
        .to_string()
    }

    fn client(generator: Arc<ScriptedGenerator>) -> ActivityGenerationClient {
        ActivityGenerationClient::new(generator).with_base_delay(Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_word_set_is_rejected_then_retried() {
        let short = response(json!([
            {"word": "cat", "configurationType": "write the word", "selectedLetterIndex": 0},
            {"word": "dog", "configurationType": "write the word", "selectedLetterIndex": 0}
        ]));
        let good = response(json!([
            {"word": "cat", "configurationType": "write the word", "selectedLetterIndex": 0},
            {"word": "dog", "configurationType": "write the word", "selectedLetterIndex": 0},
            {"word": "pig", "configurationType": "write the word", "selectedLetterIndex": 0}
        ]));
        let generator = ScriptedGenerator::new(vec![Ok(short), Ok(good)]);
        let request = GenerationRequest::new("animal words", animal_words());

        let activity = client(generator.clone()).generate_activity(&request).await.unwrap();
        assert_eq!(generator.calls(), 2);
        assert_eq!(activity.sets[0].words.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pig_name_the_picture_is_downgraded() {
        let fenced = format!(
            "Here you go:\n```json\n{}\n```",
            response(json!([
                {"word": "cat", "configurationType": "name the picture", "selectedLetterIndex": 0},
                {"word": "dog", "configurationType": "fill in the blanks", "selectedLetterIndex": 1},
                {"word": "pig", "configurationType": "name the picture", "selectedLetterIndex": 2}
            ]))
        );
        let generator = ScriptedGenerator::new(vec![Ok(fenced)]);
        let request = GenerationRequest::new("animal words", animal_words());

        let activity = client(generator.clone()).generate_activity(&request).await.unwrap();
        let pig = &activity.sets[0].words[2];
        assert_eq!(pig.configuration_type, ConfigurationType::WriteTheWord);
        assert_eq!(pig.selected_letter_index, 0);
        assert_eq!(activity.sets[0].words[0].configuration_type, ConfigurationType::NameThePicture);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_index_is_retried() {
        let bad = response(json!([
            {"word": "cat", "configurationType": "fill in the blanks", "selectedLetterIndex": 5},
            {"word": "dog", "configurationType": "write the word", "selectedLetterIndex": 0},
            {"word": "pig", "configurationType": "write the word", "selectedLetterIndex": 0}
        ]));
        let generator = ScriptedGenerator::new(vec![Ok(bad.clone()), Ok(bad.clone()), Ok(bad)]);
        let request = GenerationRequest::new("animal words", animal_words());

        let err = client(generator.clone()).generate_activity(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::SchemaValidation(_)));
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhausts_three_attempts() {
        let generator = ScriptedGenerator::new(vec![
            Err(GenerationError::RateLimited("429".into())),
            Err(GenerationError::RateLimited("429".into())),
            Err(GenerationError::RateLimited("429".into())),
        ]);
        let request = GenerationRequest::new("animal words", animal_words()).with_max_retries(2);

        let result: GenerationResult = client(generator.clone()).generate_activity(&request).await.into();
        assert_eq!(generator.calls(), 3);
        match result {
            GenerationResult::Error { retryable, .. } => assert!(retryable),
            GenerationResult::Success(_) => panic!("expected an error"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_authentication_error_is_not_retried() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::Authentication("401".into()))]);
        let request = GenerationRequest::new("animal words", animal_words());

        let result: GenerationResult = client(generator.clone()).generate_activity(&request).await.into();
        assert_eq!(generator.calls(), 1);
        assert_eq!(
            result,
            GenerationResult::Error {
                message: GenerationError::Authentication("401".into()).to_string(),
                retryable: false,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_without_json_is_retried() {
        let generator = ScriptedGenerator::new(vec![
            Ok("I cannot help with that.".to_string()),
            Ok(response(json!([
                {"word": "cat", "configurationType": "write the word"},
                {"word": "dog", "configurationType": "write the word"},
                {"word": "pig", "configurationType": "write the word"}
            ]))),
        ]);
        let request = GenerationRequest::new("animal words", animal_words());

        let activity = client(generator.clone()).generate_activity(&request).await.unwrap();
        assert_eq!(generator.calls(), 2);
        assert!(activity.sets[0].words.iter().all(|w| w.selected_letter_index == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_regeneration_returns_exactly_one_set() {
        let set = |title: &str| {
            json!({"title": title, "words": [
                {"word": "pig", "configurationType": "fill in the blanks", "selectedLetterIndex": 2},
                {"word": "dog", "configurationType": "write the word", "selectedLetterIndex": 0},
                {"word": "cat", "configurationType": "name the picture", "selectedLetterIndex": 0}
            ]})
        };
        let body = json!({"activityTitle": "Animal words", "sets": [set("Pets again"), set("Bonus")]}).to_string();
        let generator = ScriptedGenerator::new(vec![Ok(body)]);
        let request = RegenerationRequest::new("animal words", animal_words(), "Pets", "Animals at home");

        let activity = client(generator.clone()).regenerate_set(&request).await.unwrap();
        assert_eq!(activity.sets.len(), 1);
        assert_eq!(activity.sets[0].title, "Pets again");

        let seen = generator.seen.lock().unwrap();
        assert!(seen[0].system.contains("Current set title: \"Pets\""));
        assert_eq!(seen[0].sampling, SamplingParams::regeneration());
        assert_eq!(seen[0].user, "animal words");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_sends_full_word_list_and_sampling() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::Billing("402".into()))]);
        let request = GenerationRequest::new("animal words", animal_words());

        let _ = client(generator.clone()).generate_activity(&request).await;
        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].sampling, SamplingParams::generation());
        for word in ["cat", "dog", "pig"] {
            assert!(seen[0].system.contains(&format!("\"{}\"", word)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_prompt_builder_is_used() {
        let generator = ScriptedGenerator::new(vec![Err(GenerationError::Permission("403".into()))]);
        let client = client(generator.clone())
            .with_prompts(PromptBuilder::new().with_persona("You help a reading tutor."));
        assert_eq!(
            client.prompts().build_generation_prompt(&animal_words()),
            PromptBuilder::new()
                .with_persona("You help a reading tutor.")
                .build_generation_prompt(&animal_words())
        );

        let request = GenerationRequest::new("animal words", animal_words());
        let _ = client.generate_activity(&request).await;
        let seen = generator.seen.lock().unwrap();
        assert!(seen[0].system.starts_with("You help a reading tutor."));
    }

    #[tokio::test]
    async fn test_empty_word_bank_is_rejected_without_calling_the_model() {
        let generator = ScriptedGenerator::new(vec![]);
        let request = GenerationRequest::new("animal words", vec![]);

        let err = client(generator.clone()).generate_activity(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(_)));
        assert_eq!(generator.calls(), 0);
    }
}
