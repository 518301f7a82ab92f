//! Resume Adapter: produces a tailored variation of the base resume for one posting.
//! Also drafts a base resume from the profile when the user has none yet.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::posting::Posting;
use crate::models::profile::{BaseResume, Profile};
use crate::models::resume::ResumeVariation;

pub mod llm;
mod prompts;

pub use llm::LlmResumeAdapter;

#[derive(Debug, Error)]
pub enum AdaptError {
    #[error("adaptation failed: {0}")]
    AdaptationFailed(String),
}

/// Implementations must never modify the base resume; they only read it.
#[async_trait]
pub trait ResumeAdapter: Send + Sync {
    async fn adapt(
        &self,
        base_resume: &BaseResume,
        posting: &Posting,
    ) -> Result<ResumeVariation, AdaptError>;

    async fn draft_base(&self, profile: &Profile) -> Result<BaseResume, AdaptError>;
}
