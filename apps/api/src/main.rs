mod applying;
mod automation;
mod catalog;
mod config;
mod errors;
mod hh_client;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;
mod store;
mod tailoring;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::applying::{ApplicationSubmitter, CoverLetterWriter, HhApplicationSubmitter};
use crate::automation::controller::{Collaborators, RunController};
use crate::catalog::HhCatalogGateway;
use crate::config::{Config, ScorerBackend};
use crate::hh_client::HhClient;
use crate::llm_client::LlmClient;
use crate::matching::{KeywordMatchScorer, LlmMatchScorer, MatchScorer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgCandidateStore;
use crate::tailoring::LlmResumeAdapter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;
    let settings = config.run_settings()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobScout API v{}", env!("CARGO_PKG_VERSION"));

    // Candidate store (PostgreSQL)
    let store = Arc::new(PgCandidateStore::connect(&config.database_url).await?);

    // LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Job platform client, shared by the catalog and the submitter
    let hh = HhClient::new(
        config.hh_api_url.clone(),
        config.hh_access_token.clone(),
        config.hh_user_agent.clone(),
    );
    if config.hh_access_token.is_none() {
        info!("HH_ACCESS_TOKEN not set; vacancy search runs anonymously and applications will be rejected");
    }

    let catalog = Arc::new(HhCatalogGateway::new(
        hh.clone(),
        config.catalog_per_page,
        config.catalog_max_pages,
    ));

    let scorer: Arc<dyn MatchScorer> = match config.match_scorer {
        ScorerBackend::Llm => Arc::new(LlmMatchScorer::new(llm.clone())),
        ScorerBackend::Keyword => Arc::new(KeywordMatchScorer),
    };
    info!("Match scorer: {}", scorer.backend());

    let cover_letters = config
        .cover_letters
        .then(|| CoverLetterWriter::new(llm.clone()));
    let submitter: Arc<dyn ApplicationSubmitter> = Arc::new(HhApplicationSubmitter::new(
        hh,
        config.hh_resume_id.clone(),
        cover_letters,
    ));

    let automation = Arc::new(RunController::new(
        Collaborators {
            store,
            catalog,
            scorer,
            adapter: Arc::new(LlmResumeAdapter::new(llm)),
            submitter,
        },
        settings,
    ));

    // Build app state
    let state = AppState {
        automation: Arc::clone(&automation),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The HTTP server has drained; let an in-flight run reach its next checkpoint.
    automation.shutdown().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
