// LLM prompt constants for cover letters.

pub const COVER_LETTER_SYSTEM: &str = "You are a professional career consultant. \
    Reply with the letter text only, no greeting placeholders and no commentary.";

/// Cover letter prompt. Replace `{resume}`, `{vacancy}` and `{grounding_instruction}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a short cover letter (at most 150 words) for this application.
Open with why the role fits, name two or three concrete strengths that match the vacancy, close with a call to talk.

{grounding_instruction}

RESUME:
{resume}

VACANCY:
{vacancy}
"#;
