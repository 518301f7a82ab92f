use crate::applying::prompts::{COVER_LETTER_PROMPT_TEMPLATE, COVER_LETTER_SYSTEM};
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::posting::Posting;
use crate::models::resume::ResumeVariation;

/// Platform limit on the negotiation message length, in characters.
const MAX_LETTER_CHARS: usize = 10_000;

/// Drafts a cover letter for one application from the tailored resume.
#[derive(Clone)]
pub struct CoverLetterWriter {
    llm: LlmClient,
}

impl CoverLetterWriter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub async fn write(
        &self,
        variation: &ResumeVariation,
        posting: &Posting,
    ) -> Result<String, LlmError> {
        let prompt = build_prompt(variation, posting);
        let letter = self.llm.call_text(&prompt, COVER_LETTER_SYSTEM).await?;
        Ok(truncate_chars(&letter, MAX_LETTER_CHARS))
    }
}

fn build_prompt(variation: &ResumeVariation, posting: &Posting) -> String {
    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace(
            "{resume}",
            &format!("Title: {}\n\nContent: {}", variation.title, variation.content),
        )
        .replace("{vacancy}", &posting.prompt_text())
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::fixtures::posting;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_prompt_embeds_variation_and_posting() {
        let variation = ResumeVariation {
            id: Uuid::new_v4(),
            base_resume_id: Uuid::new_v4(),
            posting_id: "7".to_string(),
            title: "Backend Engineer for Company 7".to_string(),
            content: json!({"skills": ["Rust"]}),
            adaptations: vec![],
        };
        let prompt = build_prompt(&variation, &posting("7", "Rust Developer"));
        assert!(prompt.contains("Backend Engineer for Company 7"));
        assert!(prompt.contains("Title: Rust Developer"));
        assert!(!prompt.contains("{grounding_instruction}"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
