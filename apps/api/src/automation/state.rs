//! Run state: the pollable snapshot of the current (or last) automation run,
//! plus the immutable configuration a run is started with.
//!
//! Field names and enum values are the wire contract of `GET /status`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::MatchOutcome;
use crate::models::posting::Posting;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Loading,
    Analyzing,
    Generating,
    Applying,
}

/// The scored outcome of analyzing one posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyRecommendation {
    #[serde(rename = "vacancy_id")]
    pub posting_id: String,
    pub title: String,
    pub company: String,
    /// 0.0 – 1.0
    pub match_score: f64,
    pub reason: String,
}

impl VacancyRecommendation {
    pub fn scored(posting: &Posting, outcome: &MatchOutcome) -> Self {
        Self {
            posting_id: posting.id.clone(),
            title: posting.title.clone(),
            company: posting.company.clone(),
            match_score: outcome.score,
            reason: outcome.rationale.clone(),
        }
    }

    /// Zero-confidence entry for a posting the scorer could not assess.
    pub fn unscored(posting: &Posting, reason: impl std::fmt::Display) -> Self {
        Self {
            posting_id: posting.id.clone(),
            title: posting.title.clone(),
            company: posting.company.clone(),
            match_score: 0.0,
            reason: format!("Not scored: {reason}"),
        }
    }
}

/// Input of a run. Never mutated once the run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    pub specializations: Vec<String>,
    pub cities: Vec<String>,
    #[serde(default = "default_auto_apply")]
    pub auto_apply: bool,
    #[serde(default = "default_max_resumes")]
    pub max_resumes: u32,
}

fn default_auto_apply() -> bool {
    true
}

fn default_max_resumes() -> u32 {
    20
}

impl AutomationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.specializations.is_empty() {
            return Err("at least one specialization is required".to_string());
        }
        if self.cities.is_empty() {
            return Err("at least one city is required".to_string());
        }
        if self
            .specializations
            .iter()
            .chain(self.cities.iter())
            .any(|id| id.trim().is_empty())
        {
            return Err("specialization and city identifiers must not be blank".to_string());
        }
        Ok(())
    }
}

/// Snapshot of a run. Owned by the controller; callers only ever see clones.
///
/// Invariants (hold in every published snapshot):
/// - `vacancies_analyzed ≤ vacancies_loaded ≤ vacancies_total`
/// - `resumes_generated ≤ min(max_resumes, vacancies_analyzed)`
/// - `applications_sent ≤ resumes_generated`, and 0 without auto-apply
/// - `phase` is set iff `status == running`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunState {
    pub status: RunStatus,
    pub phase: Option<RunPhase>,
    pub message: String,
    pub vacancies_loaded: u32,
    pub vacancies_total: u32,
    pub vacancies_analyzed: u32,
    pub resumes_generated: u32,
    pub applications_sent: u32,
    pub recommendations: Vec<VacancyRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub(crate) cancel_requested: bool,
    #[serde(skip)]
    pub(crate) run_id: Option<Uuid>,
}

impl RunState {
    pub(crate) fn started(run_id: Uuid) -> Self {
        Self {
            status: RunStatus::Running,
            phase: Some(RunPhase::Loading),
            message: "Starting automation...".to_string(),
            run_id: Some(run_id),
            ..Self::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, RunStatus::Completed | RunStatus::Error)
    }

    pub(crate) fn enter_phase(&mut self, phase: RunPhase, message: impl Into<String>) {
        self.phase = Some(phase);
        self.message = message.into();
    }

    pub(crate) fn finish_completed(&mut self, message: impl Into<String>) {
        self.status = RunStatus::Completed;
        self.phase = None;
        self.message = message.into();
    }

    pub(crate) fn finish_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.status = RunStatus::Error;
        self.phase = None;
        self.message = format!("Error: {error}");
        self.error = Some(error);
    }
}
