//! System prompts for activity generation and single-set regeneration

use crate::types::{
    ConfigurationType, WordCandidate, MAX_TITLE_CHARS, MIN_WORDS_PER_SET,
    SUGGESTED_MAX_WORDS_PER_SET, SUGGESTED_MIN_WORDS_PER_SET,
};

const PERSONA: &str = "You are an assistant for a phonics teacher. You build practice activities for young learners strictly from the teacher's word bank.";

/// Renders the system instructions sent alongside the teacher's request.
///
/// The full word list is always embedded because the validator rejects any
/// word the model invents.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            persona: PERSONA.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the opening persona line
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// System prompt for generating a full activity with several sets
    pub fn build_generation_prompt(&self, words: &[WordCandidate]) -> String {
        format!(
            "{persona}\n\n{inventory}\n\nTask:\n- Create an activity made of one or more sets that matches the teacher's request.\n- Each set should contain between {min} and {max} words (never fewer than {floor}).\n- Group words into sets that make sense together for the request.\n\n{rules}\n\nExample of the required JSON structure:\n{example}",
            persona = self.persona,
            inventory = render_inventory(words),
            min = SUGGESTED_MIN_WORDS_PER_SET,
            max = SUGGESTED_MAX_WORDS_PER_SET,
            floor = MIN_WORDS_PER_SET,
            rules = render_rules(),
            example = example_json(2),
        )
    }

    /// System prompt for reproducing one set with a different mix of words
    pub fn build_regeneration_prompt(
        &self,
        words: &[WordCandidate],
        current_set_title: &str,
        current_set_description: &str,
    ) -> String {
        format!(
            "{persona}\n\n{inventory}\n\nThe teacher wants a fresh version of an existing set.\nCurrent set title: \"{title}\"\nCurrent set description: \"{description}\"\n\nTask:\n- Create exactly ONE set with the same theme but a different selection or order of words.\n- Vary the configuration types compared to a typical first attempt.\n- The set should contain between {min} and {max} words (never fewer than {floor}).\n- Return it inside an activity object whose \"sets\" array has exactly one entry.\n\n{rules}\n\nExample of the required JSON structure:\n{example}",
            persona = self.persona,
            inventory = render_inventory(words),
            title = current_set_title,
            description = current_set_description,
            min = SUGGESTED_MIN_WORDS_PER_SET,
            max = SUGGESTED_MAX_WORDS_PER_SET,
            floor = MIN_WORDS_PER_SET,
            rules = render_rules(),
            example = example_json(1),
        )
    }
}

fn render_inventory(words: &[WordCandidate]) -> String {
    let (with_image, without_image): (Vec<&WordCandidate>, Vec<&WordCandidate>) =
        words.iter().partition(|w| w.has_image);

    let join = |list: &[&WordCandidate]| {
        if list.is_empty() {
            "(none)".to_string()
        } else {
            list.iter()
                .map(|w| format!("\"{}\"", w.text))
                .collect::<Vec<_>>()
                .join(", ")
        }
    };

    format!(
        "Available words ({total} total). Use ONLY these words, spelled exactly as listed (case-sensitive):\nWords WITH a picture: {with}\nWords WITHOUT a picture: {without}",
        total = words.len(),
        with = join(&with_image),
        without = join(&without_image),
    )
}

fn render_rules() -> String {
    format!(
        "Rules:\n- \"activityTitle\" and every set \"title\" must be 1-{max_title} characters.\n- \"configurationType\" must be one of: \"{fill}\", \"{name}\", \"{write}\".\n- \"{fill}\": the learner fills in one missing letter; \"selectedLetterIndex\" is the zero-based index of that letter and must be less than the word length.\n- \"{name}\": the learner names the picture; use it ONLY for words WITH a picture.\n- \"{write}\": the learner writes the whole word; set \"selectedLetterIndex\" to 0.\n- For every type other than \"{fill}\", \"selectedLetterIndex\" must be 0.\n\nOutput contract:\n- Respond with a single JSON object and nothing else.\n- No markdown, no code fences, no explanations before or after the JSON.",
        max_title = MAX_TITLE_CHARS,
        fill = ConfigurationType::FillInTheBlanks,
        name = ConfigurationType::NameThePicture,
        write = ConfigurationType::WriteTheWord,
    )
}

fn example_json(set_count: usize) -> String {
    let set = r#"    {
      "title": "Short A words",
      "description": "Words with the short a sound",
      "words": [
        { "word": "cat", "configurationType": "fill in the blanks", "selectedLetterIndex": 1 },
        { "word": "bag", "configurationType": "name the picture", "selectedLetterIndex": 0 },
        { "word": "map", "configurationType": "write the word", "selectedLetterIndex": 0 }
      ]
    }"#;
    let sets = vec![set; set_count.max(1)].join(",\n");
    format!(
        "{{\n  \"activityTitle\": \"Short vowel practice\",\n  \"activityDescription\": \"Practice short vowel sounds\",\n  \"sets\": [\n{}\n  ]\n}}",
        sets
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_json_object;

    fn words() -> Vec<WordCandidate> {
        vec![
            WordCandidate::new("cat", true),
            WordCandidate::new("dog", true),
            WordCandidate::new("pig", false),
        ]
    }

    #[test]
    fn test_generation_prompt_lists_every_word_by_image_availability() {
        let prompt = PromptBuilder::new().build_generation_prompt(&words());
        assert!(prompt.contains("Words WITH a picture: \"cat\", \"dog\""));
        assert!(prompt.contains("Words WITHOUT a picture: \"pig\""));
        assert!(prompt.contains("3 total"));
    }

    #[test]
    fn test_prompt_states_rules() {
        let prompt = PromptBuilder::new().build_generation_prompt(&words());
        assert!(prompt.contains("between 5 and 8 words"));
        assert!(prompt.contains("1-30 characters"));
        assert!(prompt.contains("\"fill in the blanks\""));
        assert!(prompt.contains("single JSON object"));
    }

    #[test]
    fn test_empty_partition_is_marked() {
        let prompt = PromptBuilder::new().build_generation_prompt(&[WordCandidate::new("sun", false)]);
        assert!(prompt.contains("Words WITH a picture: (none)"));
    }

    #[test]
    fn test_regeneration_prompt_carries_current_set() {
        let prompt = PromptBuilder::new().build_regeneration_prompt(&words(), "Farm friends", "Animals on a farm");
        assert!(prompt.contains("Current set title: \"Farm friends\""));
        assert!(prompt.contains("Current set description: \"Animals on a farm\""));
        assert!(prompt.contains("exactly ONE set"));
        assert!(prompt.contains("\"pig\""));
    }

    #[test]
    fn test_example_skeleton_is_valid_json() {
        let prompt = PromptBuilder::new().build_generation_prompt(&words());
        let example = &prompt[prompt.find("structure:").unwrap()..];
        let json = extract_json_object(example).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sets"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let builder = PromptBuilder::new().with_persona("Custom persona");
        let a = builder.build_generation_prompt(&words());
        let b = builder.build_generation_prompt(&words());
        assert_eq!(a, b);
        assert!(a.starts_with("Custom persona"));
    }
}
