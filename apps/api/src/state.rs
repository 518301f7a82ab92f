use std::sync::Arc;

use crate::automation::controller::RunController;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide automation run. At most one run is active at a time.
    pub automation: Arc<RunController>,
}
