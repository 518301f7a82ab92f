use serde::{Deserialize, Serialize};

/// Salary band as published on the job platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub currency: Option<String>,
}

/// A job vacancy obtained from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub salary: Option<SalaryRange>,
    pub area: Option<String>,
    pub requirement: Option<String>,
    pub responsibility: Option<String>,
    pub url: Option<String>,
    pub key_skills: Vec<String>,
}

impl Posting {
    /// Plain-text rendering used inside LLM prompts.
    pub fn prompt_text(&self) -> String {
        let salary = self
            .salary
            .as_ref()
            .filter(|s| s.from.is_some() || s.to.is_some())
            .map(|s| {
                format!(
                    "{}-{} {}",
                    s.from.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string()),
                    s.to.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string()),
                    s.currency.as_deref().unwrap_or("RUR")
                )
            })
            .unwrap_or_default();

        format!(
            "Title: {}\nCompany: {}\nSalary: {}\nLocation: {}\nRequirements: {}\nResponsibilities: {}\nKey skills: {}",
            self.title,
            self.company,
            salary,
            self.area.as_deref().unwrap_or(""),
            self.requirement.as_deref().unwrap_or(""),
            self.responsibility.as_deref().unwrap_or(""),
            self.key_skills.join(", "),
        )
    }
}
