use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::profile::{BaseResume, Profile};
use crate::models::resume::{ResumeVariation, VariationStatus};
use crate::store::CandidateStore;

/// PostgreSQL-backed candidate store. Schema: `migrations/0001_automation.sql`.
#[derive(Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the connection pool and wraps it in a store.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        info!("PostgreSQL connection pool established");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl CandidateStore for PgCandidateStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, preferred_position, experience_years, skills,
                   preferred_salary_min, preferred_salary_max, preferred_locations,
                   summary, structured_profile, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn get_base_resume(&self, user_id: Uuid) -> Result<Option<BaseResume>> {
        let resume = sqlx::query_as::<_, BaseResume>(
            r#"
            SELECT id, user_id, title, content, is_active, created_at
            FROM base_resumes
            WHERE user_id = $1 AND is_active
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(resume)
    }

    async fn save_base_resume(&self, resume: &BaseResume) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // A user has at most one active base resume.
        sqlx::query("UPDATE base_resumes SET is_active = FALSE WHERE user_id = $1 AND is_active")
            .bind(resume.user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO base_resumes (id, user_id, title, content, is_active, created_at)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            "#,
        )
        .bind(resume.id)
        .bind(resume.user_id)
        .bind(&resume.title)
        .bind(&resume.content)
        .bind(resume.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Saved base resume {} for user {}", resume.id, resume.user_id);
        Ok(())
    }

    async fn save_variation(&self, user_id: Uuid, variation: &ResumeVariation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO resume_variations
                (id, user_id, base_resume_id, vacancy_id, title, content, adaptations, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(variation.id)
        .bind(user_id)
        .bind(variation.base_resume_id)
        .bind(&variation.posting_id)
        .bind(&variation.title)
        .bind(&variation.content)
        .bind(&variation.adaptations)
        .bind(VariationStatus::Draft.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_variation_status(
        &self,
        variation_id: Uuid,
        status: VariationStatus,
        external_application_id: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE resume_variations
            SET status = $1,
                external_application_id = COALESCE($2, external_application_id),
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(external_application_id)
        .bind(variation_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
