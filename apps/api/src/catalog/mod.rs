//! Catalog Gateway: fetches candidate postings for a set of specializations
//! and cities, one page at a time.
//!
//! The Run Controller owns retry and pacing; a gateway only classifies
//! failures so the controller knows whether to back off, retry, or abort.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::posting::Posting;

pub mod hh;
pub mod reference;

pub use hh::HhCatalogGateway;

/// One page of catalog results.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub items: Vec<Posting>,
    /// Number of postings the query reports in total (across all its pages).
    pub total: u32,
    /// Token for the following page; `None` on the last page.
    pub next_page_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The platform asked us to slow down. The controller backs off before retrying.
    #[error("catalog rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// Network or server trouble. The controller retries within its attempt budget.
    #[error("catalog transport failure: {0}")]
    TransportFailure(String),

    /// Credentials were rejected. Fatal to the run.
    #[error("catalog authentication lost: {0}")]
    AuthenticationLost(String),
}

/// Fetching a page must be idempotent per page token.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn fetch(
        &self,
        specializations: &[String],
        cities: &[String],
        page_token: Option<&str>,
    ) -> Result<CatalogPage, CatalogError>;
}
