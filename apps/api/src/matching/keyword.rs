//! Keyword scorer: measures how many profile skills a posting mentions, and where.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::matching::{MatchOutcome, MatchScorer, ScoreError};
use crate::models::posting::Posting;
use crate::models::profile::Profile;

/// Pure-Rust keyword-based fit scorer. Fast, deterministic, no LLM call.
///
/// Algorithm:
/// 1. For each distinct profile skill, take the strongest placement in the posting:
///    - listed in key skills or named in the title → 1.0
///    - mentioned in requirements → 0.8
///    - mentioned in responsibilities → 0.6
///    - absent → 0.0
/// 2. score = Σ strength / number of skills
/// 3. Classify: strong (≥0.8), partial (0.4–0.79), gap (<0.4)
pub struct KeywordMatchScorer;

#[async_trait]
impl MatchScorer for KeywordMatchScorer {
    async fn score(&self, profile: &Profile, posting: &Posting) -> Result<MatchOutcome, ScoreError> {
        Ok(compute_keyword_match(profile, posting))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

struct SkillHit {
    skill: String,
    strength: f64,
}

fn compute_keyword_match(profile: &Profile, posting: &Posting) -> MatchOutcome {
    let mut seen = HashSet::new();
    let skills: Vec<&str> = profile
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect();

    if skills.is_empty() {
        return MatchOutcome::new(0.0, "Profile lists no skills; cannot score fit.");
    }

    let key_skills: HashSet<String> = posting.key_skills.iter().map(|s| s.to_lowercase()).collect();
    let title = posting.title.to_lowercase();
    let requirement = posting.requirement.as_deref().unwrap_or("").to_lowercase();
    let responsibility = posting.responsibility.as_deref().unwrap_or("").to_lowercase();

    let hits: Vec<SkillHit> = skills
        .iter()
        .map(|skill| {
            let needle = skill.to_lowercase();
            let strength = if key_skills.contains(&needle) || title.contains(&needle) {
                1.0
            } else if requirement.contains(&needle) {
                0.8
            } else if responsibility.contains(&needle) {
                0.6
            } else {
                0.0
            };
            SkillHit {
                skill: skill.to_string(),
                strength,
            }
        })
        .collect();

    let score = hits.iter().map(|h| h.strength).sum::<f64>() / hits.len() as f64;

    let strong: Vec<&str> = hits
        .iter()
        .filter(|h| h.strength >= 0.8)
        .map(|h| h.skill.as_str())
        .collect();
    let gaps: Vec<&str> = hits
        .iter()
        .filter(|h| h.strength < 0.4)
        .map(|h| h.skill.as_str())
        .collect();

    MatchOutcome::new(score, build_rationale(score, &strong, &gaps))
}

/// Builds a human-readable rationale from score, strong matches and gaps.
fn build_rationale(score: f64, strong: &[&str], gaps: &[&str]) -> String {
    let pct = (score * 100.0).round() as u32;
    let top_strong = strong.iter().take(3).copied().collect::<Vec<_>>().join(", ");
    let top_gaps = gaps.iter().take(3).copied().collect::<Vec<_>>().join(", ");

    if pct >= 80 {
        format!("Strong fit ({pct}/100). Posting asks for: {top_strong}.")
    } else if pct >= 60 {
        format!("Moderate fit ({pct}/100). Not mentioned: {top_gaps}.")
    } else {
        format!("Low fit ({pct}/100). Not mentioned: {top_gaps}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::fixtures::{posting, profile_with_skills};

    #[test]
    fn test_key_skill_match_scores_strong() {
        let profile = profile_with_skills(&["Rust", "PostgreSQL"]);
        let mut p = posting("1", "Backend Developer");
        p.key_skills = vec!["rust".to_string(), "postgresql".to_string()];

        let outcome = compute_keyword_match(&profile, &p);
        assert_eq!(outcome.score, 1.0);
        assert!(outcome.rationale.starts_with("Strong fit (100/100)"));
    }

    #[test]
    fn test_position_weights_are_applied() {
        let profile = profile_with_skills(&["Kafka", "Docker"]);
        let mut p = posting("2", "Platform Engineer");
        p.requirement = Some("Hands-on Kafka experience".to_string());
        p.responsibility = Some("Maintain Docker images".to_string());

        let outcome = compute_keyword_match(&profile, &p);
        assert!((outcome.score - 0.7).abs() < 1e-9, "got {}", outcome.score);
    }

    #[test]
    fn test_no_match_is_low_fit_listing_gaps() {
        let profile = profile_with_skills(&["Haskell"]);
        let p = posting("3", "Java Developer");

        let outcome = compute_keyword_match(&profile, &p);
        assert_eq!(outcome.score, 0.0);
        assert!(outcome.rationale.contains("Low fit (0/100)"));
        assert!(outcome.rationale.contains("Haskell"));
    }

    #[test]
    fn test_empty_skills_scores_zero() {
        let profile = profile_with_skills(&[]);
        let outcome = compute_keyword_match(&profile, &posting("4", "Rust Developer"));
        assert_eq!(outcome.score, 0.0);
        assert!(outcome.rationale.contains("no skills"));
    }

    #[test]
    fn test_duplicate_skills_counted_once() {
        let profile = profile_with_skills(&["Rust", "rust", "Go"]);
        let p = posting("5", "Rust Developer");

        let outcome = compute_keyword_match(&profile, &p);
        assert!((outcome.score - 0.5).abs() < 1e-9, "got {}", outcome.score);
    }

    #[test]
    fn test_rationale_moderate_band() {
        let rationale = build_rationale(0.65, &["Rust"], &["Kafka"]);
        assert!(rationale.contains("65"));
        assert!(rationale.contains("Kafka"));
    }

    #[tokio::test]
    async fn test_scorer_backend_label_is_keyword() {
        let scorer = KeywordMatchScorer;
        assert_eq!(scorer.backend(), "keyword");
        let outcome = scorer
            .score(&profile_with_skills(&["Rust"]), &posting("6", "Rust Engineer"))
            .await
            .unwrap();
        assert_eq!(outcome.score, 1.0);
    }
}
