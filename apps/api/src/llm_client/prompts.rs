// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// System prompt suffix that enforces JSON-only output.
pub const JSON_ONLY_SUFFIX: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every prompt that rewrites candidate material.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Use only facts present in the candidate profile or base resume. \
    Do NOT invent employers, dates, degrees, metrics or skills. \
    If the material does not support a claim, omit it entirely.";
