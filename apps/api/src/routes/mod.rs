pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::automation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Automation API
        .route(
            "/api/automation/specializations",
            get(handlers::handle_specializations),
        )
        .route("/api/automation/cities", get(handlers::handle_cities))
        .route("/api/automation/start", post(handlers::handle_start))
        .route("/api/automation/stop", post(handlers::handle_stop))
        .route("/api/automation/status", get(handlers::handle_status))
        .route(
            "/api/automation/recommendations",
            get(handlers::handle_recommendations),
        )
        .with_state(state)
}
