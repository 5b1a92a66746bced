use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Backend names in precedence order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub backends: Vec<String>,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "UP".to_string(),
            backends: Vec::new(),
        }
    }
}

/// Reports `DOWN` with a 503 when any backend fails its local health check.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let checks = state.resolver().check_health().await;
    let (code, status) = if checks.iter().all(|(_, status)| status.is_ok()) {
        (StatusCode::OK, "UP")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
    };

    let body = HealthResponse {
        status: status.to_string(),
        backends: state.resolver().health().into_iter().map(str::to_string).collect(),
    };
    (code, Json(body))
}
