use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// The candidate profile built by the interview flow. Read-only to the automation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub preferred_position: Option<String>,
    pub experience_years: Option<i32>,
    pub skills: Vec<String>,
    pub preferred_salary_min: Option<i64>,
    pub preferred_salary_max: Option<i64>,
    pub preferred_locations: Vec<String>,
    pub summary: Option<String>,
    pub structured_profile: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Plain-text rendering used inside LLM prompts.
    pub fn prompt_text(&self) -> String {
        let salary = match (self.preferred_salary_min, self.preferred_salary_max) {
            (None, None) => "not specified".to_string(),
            (min, max) => format!(
                "{}-{}",
                min.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string()),
                max.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
            ),
        };

        let mut text = format!(
            "Position: {}\nExperience: {} years\nSkills: {}\nSalary: {}\nLocations: {}\nSummary: {}",
            self.preferred_position.as_deref().unwrap_or("not specified"),
            self.experience_years
                .map(|y| y.to_string())
                .unwrap_or_else(|| "?".to_string()),
            self.skills.join(", "),
            salary,
            self.preferred_locations.join(", "),
            self.summary.as_deref().unwrap_or(""),
        );
        if let Some(structured) = &self.structured_profile {
            text.push_str(&format!("\n\nFull profile: {structured}"));
        }
        text
    }
}

/// The user's active base resume. Variations are derived from it; it is never modified by them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BaseResume {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl BaseResume {
    /// True when there is something to tailor: a non-null, non-empty JSON document.
    pub fn has_content(&self) -> bool {
        match &self.content {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            preferred_position: Some("Backend Engineer".to_string()),
            experience_years: Some(6),
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            preferred_salary_min: Some(300_000),
            preferred_salary_max: None,
            preferred_locations: vec!["Moscow".to_string()],
            summary: Some("Builds services".to_string()),
            structured_profile: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_text_lists_skills_and_salary_band() {
        let text = profile().prompt_text();
        assert!(text.contains("Skills: Rust, PostgreSQL"));
        assert!(text.contains("Salary: 300000-?"));
        assert!(!text.contains("Full profile"));
    }

    #[test]
    fn test_base_resume_content_detection() {
        let mut resume = BaseResume {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            content: json!({}),
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(!resume.has_content());
        resume.content = Value::Null;
        assert!(!resume.has_content());
        resume.content = json!({"experience": []});
        assert!(resume.has_content());
    }
}
