use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::automation::settings::{Pacing, RetryPolicy, RunSettings};

/// Which Match Scorer backend the automation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerBackend {
    Llm,
    Keyword,
}

impl FromStr for ScorerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(ScorerBackend::Llm),
            "keyword" => Ok(ScorerBackend::Keyword),
            other => anyhow::bail!("unknown scorer backend '{other}' (expected 'llm' or 'keyword')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub hh_api_url: String,
    pub hh_access_token: Option<String>,
    pub hh_resume_id: Option<String>,
    pub hh_user_agent: String,
    pub match_scorer: ScorerBackend,
    pub cover_letters: bool,
    pub min_fit_score: f64,
    pub catalog_per_page: u32,
    pub catalog_max_pages: u32,
    pub fetch_max_attempts: u32,
    pub fetch_backoff_ms: u64,
    pub catalog_interval_ms: u64,
    pub scoring_interval_ms: u64,
    pub generation_interval_ms: u64,
    pub apply_interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            hh_api_url: std::env::var("HH_API_URL")
                .unwrap_or_else(|_| "https://api.hh.ru".to_string()),
            hh_access_token: optional_env("HH_ACCESS_TOKEN"),
            hh_resume_id: optional_env("HH_RESUME_ID"),
            hh_user_agent: std::env::var("HH_USER_AGENT")
                .unwrap_or_else(|_| "JobScout/1.0".to_string()),
            match_scorer: env_or("MATCH_SCORER", ScorerBackend::Llm)?,
            cover_letters: env_or("COVER_LETTERS", true)?,
            min_fit_score: env_or("MIN_FIT_SCORE", 0.6)?,
            catalog_per_page: env_or("CATALOG_PER_PAGE", 100)?,
            catalog_max_pages: env_or("CATALOG_MAX_PAGES", 1)?,
            fetch_max_attempts: env_or("FETCH_MAX_ATTEMPTS", 3)?,
            fetch_backoff_ms: env_or("FETCH_BACKOFF_MS", 1000)?,
            catalog_interval_ms: env_or("CATALOG_INTERVAL_MS", 500)?,
            scoring_interval_ms: env_or("SCORING_INTERVAL_MS", 200)?,
            generation_interval_ms: env_or("GENERATION_INTERVAL_MS", 500)?,
            apply_interval_ms: env_or("APPLY_INTERVAL_MS", 1000)?,
        })
    }

    /// Collects the automation tunables into the settings the Run Controller consumes.
    pub fn run_settings(&self) -> Result<RunSettings> {
        if !(0.0..=1.0).contains(&self.min_fit_score) {
            anyhow::bail!("MIN_FIT_SCORE must be within [0, 1], got {}", self.min_fit_score);
        }
        if self.fetch_max_attempts == 0 {
            anyhow::bail!("FETCH_MAX_ATTEMPTS must be at least 1");
        }

        Ok(RunSettings {
            min_fit_score: self.min_fit_score,
            retry: RetryPolicy {
                max_attempts: self.fetch_max_attempts,
                base_delay: Duration::from_millis(self.fetch_backoff_ms),
                max_delay: Duration::from_secs(30),
            },
            pacing: Pacing {
                catalog: Duration::from_millis(self.catalog_interval_ms),
                scoring: Duration::from_millis(self.scoring_interval_ms),
                generation: Duration::from_millis(self.generation_interval_ms),
                applying: Duration::from_millis(self.apply_interval_ms),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}"))
}
