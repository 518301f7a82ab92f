// LLM prompt constants for the Match Scorer.

/// System prompt for fit analysis.
pub const MATCH_SYSTEM: &str = "You are an HR analyst who assesses how well a candidate fits a vacancy. \
    Be strict: reward concrete overlap in skills, seniority and domain, penalize missing hard requirements.";

/// Fit analysis prompt. Replace `{profile}` and `{vacancy}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"Assess how well the candidate matches the vacancy.

CANDIDATE:
{profile}

VACANCY:
{vacancy}

Return a JSON object with this EXACT schema:
{
  "match_score": 0,
  "reasons": ["short reason", "short reason"],
  "required_skills": ["skill"],
  "missing_skills": ["skill"]
}

Rules:
- match_score is an integer from 0 (no fit) to 100 (perfect fit).
- reasons: at most 4 short sentences, strongest first.
- required_skills: key skills the vacancy asks for.
- missing_skills: required skills absent from the candidate profile.
"#;
