//! Candidate Store: read access to the user's profile and base resume, plus
//! bookkeeping for the resume variations a run produces.
//!
//! Profile CRUD and the interview flow live elsewhere; this seam only exposes
//! what the automation consumes. `AppState` wiring uses `PgCandidateStore`.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::profile::{BaseResume, Profile};
use crate::models::resume::{ResumeVariation, VariationStatus};

pub mod postgres;

pub use postgres::PgCandidateStore;

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    /// Returns the user's active base resume, if any.
    async fn get_base_resume(&self, user_id: Uuid) -> Result<Option<BaseResume>>;

    /// Stores a freshly drafted base resume as the user's active one.
    async fn save_base_resume(&self, resume: &BaseResume) -> Result<()>;

    /// Stores a generated variation with status `draft`.
    async fn save_variation(&self, user_id: Uuid, variation: &ResumeVariation) -> Result<()>;

    async fn update_variation_status(
        &self,
        variation_id: Uuid,
        status: VariationStatus,
        external_application_id: Option<&str>,
    ) -> Result<()>;
}
