//! Axum route handlers for the Automation API.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::automation::state::{AutomationConfig, RunState, VacancyRecommendation};
use crate::catalog::reference::{ReferenceItem, CITIES, SPECIALIZATIONS};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/automation/specializations
pub async fn handle_specializations() -> Json<&'static [ReferenceItem]> {
    Json(SPECIALIZATIONS)
}

/// GET /api/automation/cities
pub async fn handle_cities() -> Json<&'static [ReferenceItem]> {
    Json(CITIES)
}

/// POST /api/automation/start?user_id=<uuid>
///
/// Accepts the run configuration and returns immediately; progress is polled
/// via `/status`. 409 while another run is in progress.
pub async fn handle_start(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
    Json(config): Json<AutomationConfig>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let run_id = state.automation.start(query.user_id, config)?;
    info!(%run_id, user_id = %query.user_id, "Automation start accepted");

    Ok((StatusCode::ACCEPTED, MessageResponse::new("Automation started")))
}

/// POST /api/automation/stop
///
/// 409 when nothing is running.
pub async fn handle_stop(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    state.automation.stop()?;
    Ok(MessageResponse::new("Stop signal sent"))
}

/// GET /api/automation/status
pub async fn handle_status(State(state): State<AppState>) -> Json<RunState> {
    Json(state.automation.status())
}

/// GET /api/automation/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
) -> Json<Vec<VacancyRecommendation>> {
    Json(state.automation.recommendations())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::automation::controller::RunController;
    use crate::automation::settings::RunSettings;
    use crate::automation::state::RunStatus;
    use crate::automation::tests::{fake_collaborators, gated_catalog, Scripted};
    use crate::routes::build_router;
    use crate::state::AppState;

    fn app_state(controller: RunController) -> AppState {
        AppState {
            automation: Arc::new(controller),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn start_request(user_id: uuid::Uuid) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/automation/start?user_id={user_id}"))
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"specializations": ["1.221"], "cities": ["1"], "auto_apply": false, "max_resumes": 2}"#,
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_status_is_idle_before_any_run() {
        let (collaborators, _) = fake_collaborators(Scripted::pages(vec![]));
        let app = build_router(app_state(RunController::new(
            collaborators,
            RunSettings::immediate(),
        )));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/automation/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "idle");
        assert_eq!(json["phase"], Value::Null);
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_start_then_conflict_then_stop() {
        let (catalog, gate) = gated_catalog();
        let (collaborators, fakes) = fake_collaborators(catalog);
        let state = app_state(RunController::new(collaborators, RunSettings::immediate()));
        let app = build_router(state.clone());

        let response = app
            .clone()
            .oneshot(start_request(fakes.user_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_json(response).await["message"], "Automation started");

        let response = app
            .clone()
            .oneshot(start_request(fakes.user_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"]["code"], "CONFLICT");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/automation/stop")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message"], "Stop signal sent");

        gate.notify_one();
        state.automation.shutdown().await;
        assert_eq!(state.automation.status().status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn test_stop_when_idle_is_conflict() {
        let (collaborators, _) = fake_collaborators(Scripted::pages(vec![]));
        let app = build_router(app_state(RunController::new(
            collaborators,
            RunSettings::immediate(),
        )));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/automation/stop")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "Automation is not running"
        );
    }

    #[tokio::test]
    async fn test_reference_lists_are_served() {
        let (collaborators, _) = fake_collaborators(Scripted::pages(vec![]));
        let app = build_router(app_state(RunController::new(
            collaborators,
            RunSettings::immediate(),
        )));

        for uri in ["/api/automation/specializations", "/api/automation/cities"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            let items = json.as_array().unwrap();
            assert!(!items.is_empty());
            assert!(items[0]["id"].is_string());
            assert!(items[0]["name"].is_string());
        }
    }

    #[tokio::test]
    async fn test_start_requires_user_id() {
        let (collaborators, _) = fake_collaborators(Scripted::pages(vec![]));
        let app = build_router(app_state(RunController::new(
            collaborators,
            RunSettings::immediate(),
        )));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/automation/start")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"specializations": ["1"], "cities": ["1"]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
