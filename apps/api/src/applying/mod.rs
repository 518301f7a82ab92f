//! Application Submitter: sends a tailored variation to the job platform.
//!
//! Submission is not idempotent. Callers make at most one `submit` call per
//! posting per run and never retry automatically.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::posting::Posting;
use crate::models::resume::ResumeVariation;

pub mod cover_letter;
pub mod hh;
mod prompts;

pub use cover_letter::CoverLetterWriter;
pub use hh::HhApplicationSubmitter;

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    /// Platform id of the created application; `None` when the platform did not report one.
    pub external_application_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApplyError {
    /// Business rule refusal, e.g. already applied or no published resume.
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    /// Transient failure; the outcome on the platform side is unknown.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// Credentials were rejected. Fatal to the run.
    #[error("job platform authentication lost: {0}")]
    AuthenticationLost(String),
}

#[async_trait]
pub trait ApplicationSubmitter: Send + Sync {
    async fn submit(
        &self,
        variation: &ResumeVariation,
        posting: &Posting,
    ) -> Result<SubmissionReceipt, ApplyError>;
}
