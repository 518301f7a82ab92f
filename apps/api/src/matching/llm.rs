use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::llm_client::prompts::JSON_ONLY_SUFFIX;
use crate::llm_client::LlmClient;
use crate::matching::prompts::{MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM};
use crate::matching::{MatchOutcome, MatchScorer, ScoreError};
use crate::models::posting::Posting;
use crate::models::profile::Profile;

/// Semantic fit scorer via Claude.
pub struct LlmMatchScorer {
    llm: LlmClient,
    system: String,
}

impl LlmMatchScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            system: format!("{MATCH_SYSTEM} {JSON_ONLY_SUFFIX}"),
        }
    }
}

/// The model's raw fit analysis. `match_score` is on a 0–100 scale.
#[derive(Debug, Deserialize)]
struct FitAnalysis {
    match_score: f64,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    required_skills: Vec<String>,
    #[serde(default)]
    missing_skills: Vec<String>,
}

impl FitAnalysis {
    fn into_outcome(self) -> MatchOutcome {
        let mut rationale = self
            .reasons
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .take(2)
            .collect::<Vec<_>>()
            .join("; ");

        if rationale.is_empty() && !self.missing_skills.is_empty() {
            rationale = format!("Missing: {}", self.missing_skills.join(", "));
        }

        MatchOutcome::new(self.match_score / 100.0, rationale)
    }
}

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(&self, profile: &Profile, posting: &Posting) -> Result<MatchOutcome, ScoreError> {
        let prompt = MATCH_PROMPT_TEMPLATE
            .replace("{profile}", &profile.prompt_text())
            .replace("{vacancy}", &posting.prompt_text());

        let analysis: FitAnalysis = self
            .llm
            .call_json(&prompt, &self.system)
            .await
            .map_err(|e| ScoreError::ScoringUnavailable(e.to_string()))?;

        debug!(
            "Posting {} scored {} (requires: {})",
            posting.id,
            analysis.match_score,
            analysis.required_skills.join(", ")
        );

        Ok(analysis.into_outcome())
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_normalizes_percent_score() {
        let analysis: FitAnalysis = serde_json::from_str(
            r#"{
                "match_score": 85,
                "reasons": ["Strong Rust background", "Matching seniority", "Same city"],
                "required_skills": ["Rust", "Tokio"]
            }"#,
        )
        .unwrap();

        let outcome = analysis.into_outcome();
        assert!((outcome.score - 0.85).abs() < 1e-9);
        assert_eq!(outcome.rationale, "Strong Rust background; Matching seniority");
    }

    #[test]
    fn test_analysis_out_of_range_score_is_clamped() {
        let analysis = FitAnalysis {
            match_score: 140.0,
            reasons: vec![],
            required_skills: vec![],
            missing_skills: vec!["Kotlin".to_string()],
        };
        let outcome = analysis.into_outcome();
        assert_eq!(outcome.score, 1.0);
        assert_eq!(outcome.rationale, "Missing: Kotlin");
    }

    #[test]
    fn test_analysis_requires_match_score() {
        let result: Result<FitAnalysis, _> = serde_json::from_str(r#"{"reasons": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_prompt_template_has_placeholders() {
        assert!(MATCH_PROMPT_TEMPLATE.contains("{profile}"));
        assert!(MATCH_PROMPT_TEMPLATE.contains("{vacancy}"));
    }
}
