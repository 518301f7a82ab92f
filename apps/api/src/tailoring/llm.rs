use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, JSON_ONLY_SUFFIX};
use crate::llm_client::LlmClient;
use crate::models::posting::Posting;
use crate::models::profile::{BaseResume, Profile};
use crate::models::resume::ResumeVariation;
use crate::tailoring::prompts::{
    ADAPTATION_PROMPT_TEMPLATE, BASE_RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM,
};
use crate::tailoring::{AdaptError, ResumeAdapter};

/// Resume Adapter backed by Claude.
pub struct LlmResumeAdapter {
    llm: LlmClient,
    system: String,
}

impl LlmResumeAdapter {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            system: format!("{RESUME_SYSTEM} {JSON_ONLY_SUFFIX}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdaptationReply {
    adapted_resume: Option<Value>,
    #[serde(default)]
    adaptations: Vec<String>,
}

#[async_trait]
impl ResumeAdapter for LlmResumeAdapter {
    async fn adapt(
        &self,
        base_resume: &BaseResume,
        posting: &Posting,
    ) -> Result<ResumeVariation, AdaptError> {
        check_tailorable(base_resume, posting)?;

        let prompt = ADAPTATION_PROMPT_TEMPLATE
            .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
            .replace(
                "{base_resume}",
                &format!("Title: {}\n\nContent: {}", base_resume.title, base_resume.content),
            )
            .replace("{vacancy}", &posting.prompt_text());

        let reply: AdaptationReply = self
            .llm
            .call_json(&prompt, &self.system)
            .await
            .map_err(|e| AdaptError::AdaptationFailed(format!("LLM call failed: {e}")))?;

        Ok(build_variation(base_resume, posting, reply))
    }

    async fn draft_base(&self, profile: &Profile) -> Result<BaseResume, AdaptError> {
        let prompt = BASE_RESUME_PROMPT_TEMPLATE
            .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
            .replace("{profile}", &profile.prompt_text());

        let content: Value = self
            .llm
            .call_json(&prompt, &self.system)
            .await
            .map_err(|e| AdaptError::AdaptationFailed(format!("LLM call failed: {e}")))?;

        base_from_draft(profile, content)
    }
}

/// Rejects inputs that cannot produce a meaningful variation.
fn check_tailorable(base_resume: &BaseResume, posting: &Posting) -> Result<(), AdaptError> {
    if !base_resume.has_content() {
        return Err(AdaptError::AdaptationFailed(format!(
            "base resume {} has no content",
            base_resume.id
        )));
    }
    if posting.title.trim().is_empty() {
        return Err(AdaptError::AdaptationFailed(format!(
            "posting {} has no title",
            posting.id
        )));
    }
    Ok(())
}

/// Falls back to the base content when the model omits `adapted_resume`.
fn build_variation(base_resume: &BaseResume, posting: &Posting, reply: AdaptationReply) -> ResumeVariation {
    let title = if posting.company.trim().is_empty() {
        format!("{} — {}", base_resume.title, posting.title)
    } else {
        format!("{} for {}", base_resume.title, posting.company)
    };

    ResumeVariation {
        id: Uuid::new_v4(),
        base_resume_id: base_resume.id,
        posting_id: posting.id.clone(),
        title,
        content: reply
            .adapted_resume
            .filter(|v| !v.is_null())
            .unwrap_or_else(|| base_resume.content.clone()),
        adaptations: reply.adaptations,
    }
}

fn base_from_draft(profile: &Profile, content: Value) -> Result<BaseResume, AdaptError> {
    if !content.is_object() {
        return Err(AdaptError::AdaptationFailed(
            "drafted base resume is not a JSON object".to_string(),
        ));
    }

    let title = content
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| profile.preferred_position.clone())
        .unwrap_or_else(|| "Resume".to_string());

    Ok(BaseResume {
        id: Uuid::new_v4(),
        user_id: profile.user_id,
        title,
        content,
        is_active: true,
        created_at: Utc::now(),
    })
}
