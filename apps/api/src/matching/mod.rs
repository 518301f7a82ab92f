//! Match Scorer: pluggable, trait-based scorer that measures a candidate
//! profile against one posting.
//!
//! Default: `LlmMatchScorer` (semantic, via Claude).
//! Alternative: `KeywordMatchScorer` (pure-Rust, deterministic, no LLM call).
//!
//! The Run Controller holds an `Arc<dyn MatchScorer>`, chosen at startup via `MATCH_SCORER`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::posting::Posting;
use crate::models::profile::Profile;

pub mod keyword;
pub mod llm;
mod prompts;

pub use keyword::KeywordMatchScorer;
pub use llm::LlmMatchScorer;

/// Fit of one posting for the candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// 0.0 – 1.0
    pub score: f64,
    pub rationale: String,
}

impl MatchOutcome {
    /// Builds an outcome, forcing the score into [0, 1] (NaN becomes 0).
    pub fn new(score: f64, rationale: impl Into<String>) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self {
            score,
            rationale: rationale.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("scoring unavailable: {0}")]
    ScoringUnavailable(String),
}

/// Scoring is side-effect free from the caller's perspective.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, profile: &Profile, posting: &Posting) -> Result<MatchOutcome, ScoreError>;

    /// Backend name for logs ("keyword" or "llm").
    fn backend(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::posting::Posting;
    use crate::models::profile::Profile;

    pub fn profile_with_skills(skills: &[&str]) -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            preferred_position: Some("Backend Engineer".to_string()),
            experience_years: Some(5),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            preferred_salary_min: None,
            preferred_salary_max: None,
            preferred_locations: vec![],
            summary: None,
            structured_profile: None,
            updated_at: Utc::now(),
        }
    }

    pub fn posting(id: &str, title: &str) -> Posting {
        Posting {
            id: id.to_string(),
            title: title.to_string(),
            company: format!("Company {id}"),
            salary: None,
            area: None,
            requirement: None,
            responsibility: None,
            url: None,
            key_skills: vec![],
        }
    }
}
