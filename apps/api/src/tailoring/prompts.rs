// LLM prompt constants for resume tailoring.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for every resume-writing call.
pub const RESUME_SYSTEM: &str = "You are a professional resume writer.";

/// Base resume drafting prompt. Replace `{profile}` and `{grounding_instruction}`.
pub const BASE_RESUME_PROMPT_TEMPLATE: &str = r#"Write a base resume for the candidate below.

{grounding_instruction}

CANDIDATE:
{profile}

Return a JSON object with this EXACT schema:
{
  "title": "Desired position",
  "summary": "2-3 sentence professional summary",
  "skills": ["skill"],
  "experience": [
    {"company": "", "position": "", "period": "", "achievements": ["..."]}
  ],
  "education": [
    {"institution": "", "degree": "", "year": ""}
  ]
}
"#;

/// Variation prompt. Replace `{base_resume}`, `{vacancy}` and `{grounding_instruction}`.
pub const ADAPTATION_PROMPT_TEMPLATE: &str = r#"Adapt the base resume to the vacancy below.
Reorder and rephrase to emphasize what the vacancy asks for; mirror its terminology where the resume supports it.

{grounding_instruction}

BASE RESUME:
{base_resume}

VACANCY:
{vacancy}

Return a JSON object with this EXACT schema:
{
  "adapted_resume": { "title": "", "summary": "", "skills": [], "experience": [], "education": [] },
  "adaptations": ["short description of each change"]
}
"#;
