//! Run Controller: owns the single automation run of the process.
//!
//! `start`, `stop`, `status` and `recommendations` never block: the run itself
//! executes on a spawned worker task, and every state change is published as a
//! whole new snapshot through a `watch` channel, so readers never see a torn update.

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::applying::ApplicationSubmitter;
use crate::automation::runner::{PipelineRun, Progress};
use crate::automation::settings::RunSettings;
use crate::automation::state::{AutomationConfig, RunState, VacancyRecommendation};
use crate::catalog::CatalogGateway;
use crate::matching::MatchScorer;
use crate::store::CandidateStore;
use crate::tailoring::ResumeAdapter;

/// Rejected commands. Reported to the caller; never recorded as run failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Automation already running")]
    AlreadyRunning,

    #[error("Automation is not running")]
    NotRunning,
}

/// External services a run talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn CandidateStore>,
    pub catalog: Arc<dyn CatalogGateway>,
    pub scorer: Arc<dyn MatchScorer>,
    pub adapter: Arc<dyn ResumeAdapter>,
    pub submitter: Arc<dyn ApplicationSubmitter>,
}

pub struct RunController {
    state: Arc<watch::Sender<RunState>>,
    collaborators: Collaborators,
    settings: RunSettings,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl RunController {
    pub fn new(collaborators: Collaborators, settings: RunSettings) -> Self {
        let (state, _) = watch::channel(RunState::default());
        Self {
            state: Arc::new(state),
            collaborators,
            settings,
            worker: Mutex::new(None),
        }
    }

    /// Starts a run for `user_id`. Returns the run id; execution proceeds in the background.
    ///
    /// Rejected with `AlreadyRunning` while a run is in progress; the current
    /// state is left untouched in that case.
    pub fn start(&self, user_id: Uuid, config: AutomationConfig) -> Result<Uuid, CommandError> {
        let run_id = Uuid::new_v4();

        let accepted = self.state.send_if_modified(|state| {
            if state.is_running() {
                return false;
            }
            *state = RunState::started(run_id);
            true
        });
        if !accepted {
            return Err(CommandError::AlreadyRunning);
        }

        info!(
            %run_id,
            %user_id,
            specializations = config.specializations.len(),
            cities = config.cities.len(),
            auto_apply = config.auto_apply,
            max_resumes = config.max_resumes,
            "Automation run accepted"
        );

        let run = PipelineRun::new(
            run_id,
            user_id,
            config,
            Progress::new(run_id, Arc::clone(&self.state)),
            self.collaborators.clone(),
            self.settings,
        );
        let handle = tokio::spawn(run.execute());

        // Any previous handle belongs to a run that already published a terminal state.
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(run_id)
    }

    /// Requests cooperative cancellation. The worker stops at its next
    /// per-item checkpoint and finishes the run as `completed`.
    pub fn stop(&self) -> Result<(), CommandError> {
        let mut running = false;
        self.state.send_if_modified(|state| {
            if !state.is_running() {
                return false;
            }
            running = true;
            if state.cancel_requested {
                return false;
            }
            state.cancel_requested = true;
            state.message = "Stopping after the current item...".to_string();
            true
        });

        if running {
            info!("Automation stop requested");
            Ok(())
        } else {
            Err(CommandError::NotRunning)
        }
    }

    /// Consistent snapshot of the current run (or the last one, or idle).
    pub fn status(&self) -> RunState {
        self.state.borrow().clone()
    }

    /// Recommendations accumulated by the latest run, in analysis order.
    pub fn recommendations(&self) -> Vec<VacancyRecommendation> {
        self.state.borrow().recommendations.clone()
    }

    /// Receiver notified whenever a new snapshot is published. Test hook; callers poll `status`.
    #[cfg(test)]
    pub(crate) fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Stops the current run, if any, and waits for its worker to finish.
    pub async fn shutdown(&self) {
        if self.stop().is_ok() {
            info!("Waiting for the automation run to reach a checkpoint...");
        }

        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Automation worker ended abnormally: {e}");
            }
        }
    }
}
