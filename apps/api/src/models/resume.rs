use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Lifecycle of a tailored resume variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationStatus {
    /// Generated, not yet submitted.
    Draft,
    /// Submission was attempted and failed; left for the user to apply manually.
    Ready,
    /// Submitted to the job platform.
    Applied,
}

impl VariationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VariationStatus::Draft => "draft",
            VariationStatus::Ready => "ready",
            VariationStatus::Applied => "applied",
        }
    }
}

impl fmt::Display for VariationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resume tailored for one posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeVariation {
    pub id: Uuid,
    pub base_resume_id: Uuid,
    pub posting_id: String,
    pub title: String,
    pub content: Value,
    /// Short notes on what was changed relative to the base resume.
    pub adaptations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variation_status_wire_names() {
        assert_eq!(serde_json::to_string(&VariationStatus::Applied).unwrap(), "\"applied\"");
        assert_eq!(VariationStatus::Ready.to_string(), "ready");
        assert_eq!(VariationStatus::Draft.as_str(), "draft");
    }
}
