//! Phase runner: executes one run, from loading through applying.
//!
//! Everything runs sequentially on the worker task. Each external call is
//! preceded by a cancellation checkpoint; an in-flight call is never interrupted.
//! Per-item failures are absorbed into counters and recommendations; only
//! systemic failures end the run with `status = error`.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::slice;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::applying::ApplyError;
use crate::automation::controller::Collaborators;
use crate::automation::settings::{pace, RunSettings};
use crate::automation::state::{AutomationConfig, RunPhase, RunState, VacancyRecommendation};
use crate::catalog::{CatalogError, CatalogPage};
use crate::models::posting::Posting;
use crate::models::profile::{BaseResume, Profile};
use crate::models::resume::{ResumeVariation, VariationStatus};

/// Failures that invalidate continuing the run.
#[derive(Debug, Error)]
pub enum SystemicError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Profile not found. Complete the interview first.")]
    ProfileMissing,

    #[error("Candidate store unavailable: {0}")]
    Store(String),

    #[error("Could not prepare a base resume: {0}")]
    BaseResume(String),

    #[error("Catalog authentication lost: {0}")]
    CatalogAuth(String),

    #[error("Job platform authentication lost: {0}")]
    SubmitterAuth(String),
}

/// Why a run stopped before finishing all phases.
enum Halt {
    Cancelled,
    Systemic(SystemicError),
}

impl From<SystemicError> for Halt {
    fn from(err: SystemicError) -> Self {
        Halt::Systemic(err)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Progress publishing
// ────────────────────────────────────────────────────────────────────────────

/// Write handle to the shared run state, scoped to one run.
///
/// Updates from a run that is no longer current are ignored. If the worker
/// dies while its run is still marked running, dropping the handle marks it failed.
pub(crate) struct Progress {
    run_id: Uuid,
    state: Arc<watch::Sender<RunState>>,
}

impl Progress {
    pub(crate) fn new(run_id: Uuid, state: Arc<watch::Sender<RunState>>) -> Self {
        Self { run_id, state }
    }

    /// Applies `f` as one atomic snapshot change.
    fn update(&self, f: impl FnOnce(&mut RunState)) {
        self.state.send_if_modified(|state| {
            if state.run_id != Some(self.run_id) {
                return false;
            }
            f(state);
            true
        });
    }

    fn cancel_requested(&self) -> bool {
        let state = self.state.borrow();
        state.run_id == Some(self.run_id) && state.cancel_requested
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if state.run_id != Some(self.run_id) || !state.is_running() {
                return false;
            }
            state.finish_error("Automation worker stopped unexpectedly");
            true
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Run
// ────────────────────────────────────────────────────────────────────────────

/// A generated variation waiting for the applying phase.
struct Tailored {
    variation: ResumeVariation,
    posting: Posting,
}

pub(crate) struct PipelineRun {
    run_id: Uuid,
    user_id: Uuid,
    config: AutomationConfig,
    progress: Progress,
    services: Collaborators,
    settings: RunSettings,
}

impl PipelineRun {
    pub(crate) fn new(
        run_id: Uuid,
        user_id: Uuid,
        config: AutomationConfig,
        progress: Progress,
        services: Collaborators,
        settings: RunSettings,
    ) -> Self {
        Self {
            run_id,
            user_id,
            config,
            progress,
            services,
            settings,
        }
    }

    /// Runs every phase and publishes the terminal state.
    pub(crate) async fn execute(self) {
        let started = Instant::now();
        info!(run_id = %self.run_id, "Automation run started");

        match self.run_phases().await {
            Ok(()) => {
                let summary = self.summary();
                info!(run_id = %self.run_id, elapsed_ms = started.elapsed().as_millis() as u64, "Automation completed: {summary}");
                self.progress
                    .update(|s| s.finish_completed(format!("Automation completed. {summary}")));
            }
            Err(Halt::Cancelled) => {
                let summary = self.summary();
                info!(run_id = %self.run_id, "Automation stopped by request: {summary}");
                self.progress.update(|s| {
                    s.finish_completed(format!("Stopped by user; results are partial. {summary}"))
                });
            }
            Err(Halt::Systemic(e)) => {
                error!(run_id = %self.run_id, "Automation failed: {e}");
                self.progress.update(|s| s.finish_error(e.to_string()));
            }
        }
    }

    async fn run_phases(&self) -> Result<(), Halt> {
        self.config
            .validate()
            .map_err(SystemicError::InvalidConfig)?;

        let profile = self
            .services
            .store
            .get_profile(self.user_id)
            .await
            .map_err(|e| SystemicError::Store(e.to_string()))?
            .ok_or(SystemicError::ProfileMissing)?;
        let base_resume = self
            .services
            .store
            .get_base_resume(self.user_id)
            .await
            .map_err(|e| SystemicError::Store(e.to_string()))?;

        let postings = self.load_postings().await?;
        let recommendations = self.analyze(&profile, &postings).await?;
        let tailored = self
            .generate(&profile, base_resume, &postings, &recommendations)
            .await?;

        if self.config.auto_apply {
            self.apply(&tailored).await?;
        }
        Ok(())
    }

    /// Cancellation checkpoint, placed before every external call.
    fn checkpoint(&self) -> Result<(), Halt> {
        if self.progress.cancel_requested() {
            Err(Halt::Cancelled)
        } else {
            Ok(())
        }
    }

    fn summary(&self) -> String {
        let state = self.progress.state.borrow();
        format!(
            "Loaded {}, analyzed {}, resumes generated {}, applications sent {}.",
            state.vacancies_loaded,
            state.vacancies_analyzed,
            state.resumes_generated,
            state.applications_sent
        )
    }

    // ── Phase 1: loading ────────────────────────────────────────────────────

    /// Walks every city × specialization query, deduplicating postings by id
    /// (first occurrence wins).
    async fn load_postings(&self) -> Result<Vec<Posting>, Halt> {
        self.progress
            .update(|s| s.enter_phase(RunPhase::Loading, "Loading vacancies..."));

        let mut seen: HashSet<String> = HashSet::new();
        let mut postings: Vec<Posting> = Vec::new();

        for city in &self.config.cities {
            for specialization in &self.config.specializations {
                let mut page_token: Option<String> = None;
                let mut first_page = true;

                loop {
                    self.checkpoint()?;
                    self.progress.update(|s| {
                        s.message = format!(
                            "Loading: city {city}, specialization {specialization}..."
                        )
                    });

                    // An exhausted page ends its query; later tokens are unreachable.
                    let Some(page) = self
                        .fetch_page(specialization, city, page_token.as_deref())
                        .await?
                    else {
                        break;
                    };

                    let CatalogPage {
                        items,
                        total,
                        next_page_token,
                    } = page;

                    let before = postings.len();
                    for posting in items {
                        if seen.insert(posting.id.clone()) {
                            postings.push(posting);
                        }
                    }
                    let fresh = (postings.len() - before) as u32;

                    self.progress.update(|s| {
                        if first_page {
                            s.vacancies_total += total;
                        }
                        s.vacancies_loaded += fresh;
                        // A catalog under-reporting its total must not break loaded ≤ total.
                        s.vacancies_total = s.vacancies_total.max(s.vacancies_loaded);
                    });
                    first_page = false;

                    pace(self.settings.pacing.catalog).await;

                    match next_page_token {
                        Some(token) => page_token = Some(token),
                        None => break,
                    }
                }
            }
        }

        let loaded = postings.len();
        info!(run_id = %self.run_id, loaded, "Loading finished");
        self.progress
            .update(|s| s.message = format!("Loaded {loaded} vacancies"));
        Ok(postings)
    }

    /// Fetches one page with bounded retries.
    ///
    /// Both `RateLimited` and `TransportFailure` wait an exponentially growing
    /// backoff (never shorter than the catalog pacing interval). Returns `None`
    /// once attempts are exhausted. Page tokens are opaque, so the caller cannot
    /// skip past a lost page: the rest of that query is dropped and loading
    /// moves on to the next one.
    async fn fetch_page(
        &self,
        specialization: &String,
        city: &String,
        page_token: Option<&str>,
    ) -> Result<Option<CatalogPage>, Halt> {
        let retry = self.settings.retry;

        for attempt in 1..=retry.max_attempts {
            let result = self
                .services
                .catalog
                .fetch(
                    slice::from_ref(specialization),
                    slice::from_ref(city),
                    page_token,
                )
                .await;

            let wait = match result {
                Ok(page) => return Ok(Some(page)),
                Err(CatalogError::AuthenticationLost(msg)) => {
                    return Err(SystemicError::CatalogAuth(msg).into())
                }
                Err(CatalogError::RateLimited { retry_after }) => {
                    let backoff = retry.backoff(attempt);
                    let wait = retry_after.map_or(backoff, |hint| hint.max(backoff));
                    warn!(
                        run_id = %self.run_id,
                        %city,
                        %specialization,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "Catalog rate limited"
                    );
                    wait
                }
                Err(CatalogError::TransportFailure(msg)) => {
                    warn!(
                        run_id = %self.run_id,
                        %city,
                        %specialization,
                        attempt,
                        "Catalog fetch failed: {msg}"
                    );
                    retry.backoff(attempt).max(self.settings.pacing.catalog)
                }
            };

            if attempt < retry.max_attempts {
                pace(wait).await;
            }
        }

        warn!(
            run_id = %self.run_id,
            %city,
            %specialization,
            page = page_token.unwrap_or("first"),
            "Giving up on catalog query after {} attempts; loaded data is partial",
            retry.max_attempts
        );
        Ok(None)
    }

    // ── Phase 2: analyzing ──────────────────────────────────────────────────

    /// Scores every posting in arrival order. Scorer failures become
    /// zero-confidence recommendations.
    async fn analyze(
        &self,
        profile: &Profile,
        postings: &[Posting],
    ) -> Result<Vec<VacancyRecommendation>, Halt> {
        let scorer = &self.services.scorer;
        info!(run_id = %self.run_id, backend = scorer.backend(), "Analyzing {} vacancies", postings.len());
        self.progress
            .update(|s| s.enter_phase(RunPhase::Analyzing, "Analyzing vacancies..."));

        let total = postings.len();
        let mut recommendations = Vec::with_capacity(total);

        for posting in postings {
            self.checkpoint()?;

            let recommendation = match scorer.score(profile, posting).await {
                Ok(outcome) => VacancyRecommendation::scored(posting, &outcome),
                Err(e) => {
                    warn!(run_id = %self.run_id, posting_id = %posting.id, "Scoring failed: {e}");
                    VacancyRecommendation::unscored(posting, &e)
                }
            };

            recommendations.push(recommendation.clone());
            self.progress.update(|s| {
                s.recommendations.push(recommendation);
                s.vacancies_analyzed += 1;
                s.message = format!("Analyzed {} of {total} vacancies", s.vacancies_analyzed);
            });

            pace(self.settings.pacing.scoring).await;
        }

        Ok(recommendations)
    }

    // ── Phase 3: generating ─────────────────────────────────────────────────

    /// Tailors resumes for the best-scoring postings until `max_resumes`
    /// succeed. Failed generations do not use up the quota.
    async fn generate(
        &self,
        profile: &Profile,
        base_resume: Option<BaseResume>,
        postings: &[Posting],
        recommendations: &[VacancyRecommendation],
    ) -> Result<Vec<Tailored>, Halt> {
        self.progress
            .update(|s| s.enter_phase(RunPhase::Generating, "Generating resumes..."));

        let quota = self.config.max_resumes as usize;
        let candidates = select_candidates(recommendations, self.settings.min_fit_score);
        if candidates.is_empty() || quota == 0 {
            info!(run_id = %self.run_id, candidates = candidates.len(), quota, "Nothing to generate");
            self.progress
                .update(|s| s.message = "No vacancies qualify for a tailored resume".to_string());
            return Ok(Vec::new());
        }

        let base_resume = match base_resume {
            Some(base) => base,
            None => self.draft_base_resume(profile).await?,
        };

        let mut tailored: Vec<Tailored> = Vec::new();

        for index in candidates {
            if tailored.len() >= quota {
                break;
            }
            self.checkpoint()?;

            let posting = &postings[index];
            self.progress.update(|s| {
                s.message = format!("Generating resume for {}...", display_company(posting))
            });

            match self.services.adapter.adapt(&base_resume, posting).await {
                Ok(variation) => {
                    if let Err(e) = self
                        .services
                        .store
                        .save_variation(self.user_id, &variation)
                        .await
                    {
                        warn!(run_id = %self.run_id, posting_id = %posting.id, "Could not persist variation: {e}");
                    }
                    tailored.push(Tailored {
                        variation,
                        posting: posting.clone(),
                    });
                    self.progress.update(|s| s.resumes_generated += 1);
                }
                Err(e) => {
                    warn!(run_id = %self.run_id, posting_id = %posting.id, "Resume generation failed: {e}");
                }
            }

            pace(self.settings.pacing.generation).await;
        }

        let generated = tailored.len();
        self.progress
            .update(|s| s.message = format!("Generated {generated} resumes"));
        Ok(tailored)
    }

    async fn draft_base_resume(&self, profile: &Profile) -> Result<BaseResume, Halt> {
        self.checkpoint()?;
        info!(run_id = %self.run_id, "No base resume on file; drafting one from the profile");
        self.progress
            .update(|s| s.message = "Creating a base resume...".to_string());

        let base = self
            .services
            .adapter
            .draft_base(profile)
            .await
            .map_err(|e| SystemicError::BaseResume(e.to_string()))?;

        if let Err(e) = self.services.store.save_base_resume(&base).await {
            warn!(run_id = %self.run_id, "Could not persist drafted base resume: {e}");
        }
        Ok(base)
    }

    // ── Phase 4: applying ───────────────────────────────────────────────────

    /// Submits each generated variation exactly once. No automatic retries.
    async fn apply(&self, tailored: &[Tailored]) -> Result<(), Halt> {
        self.progress
            .update(|s| s.enter_phase(RunPhase::Applying, "Sending applications..."));

        for item in tailored {
            self.checkpoint()?;

            let posting = &item.posting;
            self.progress.update(|s| {
                s.message = format!("Applying to {}...", display_company(posting))
            });

            let (status, external_id) = match self
                .services
                .submitter
                .submit(&item.variation, posting)
                .await
            {
                Ok(receipt) => {
                    info!(
                        run_id = %self.run_id,
                        posting_id = %posting.id,
                        application_id = receipt.external_application_id.as_deref().unwrap_or("unreported"),
                        "Application sent"
                    );
                    self.progress.update(|s| s.applications_sent += 1);
                    (VariationStatus::Applied, receipt.external_application_id)
                }
                Err(ApplyError::AuthenticationLost(msg)) => {
                    return Err(SystemicError::SubmitterAuth(msg).into())
                }
                Err(e) => {
                    warn!(run_id = %self.run_id, posting_id = %posting.id, "Application not sent: {e}");
                    (VariationStatus::Ready, None)
                }
            };

            if let Err(e) = self
                .services
                .store
                .update_variation_status(item.variation.id, status, external_id.as_deref())
                .await
            {
                warn!(run_id = %self.run_id, posting_id = %posting.id, "Could not record variation status: {e}");
            }

            pace(self.settings.pacing.applying).await;
        }

        let sent = self.progress.state.borrow().applications_sent;
        self.progress
            .update(|s| s.message = format!("Sent {sent} applications"));
        Ok(())
    }
}

/// Indices of postings eligible for tailoring, best first.
///
/// Sorted by descending score; ties keep arrival order. Postings below
/// `min_score` are excluded even when that leaves the quota unmet.
pub(crate) fn select_candidates(
    recommendations: &[VacancyRecommendation],
    min_score: f64,
) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..recommendations.len())
        .filter(|&i| recommendations[i].match_score >= min_score)
        .collect();

    // `sort_by` is stable, which keeps equal scores in arrival order.
    indices.sort_by(|&a, &b| {
        recommendations[b]
            .match_score
            .partial_cmp(&recommendations[a].match_score)
            .unwrap_or(Ordering::Equal)
    });
    indices
}

fn display_company(posting: &Posting) -> &str {
    if posting.company.trim().is_empty() {
        &posting.title
    } else {
        &posting.company
    }
}
