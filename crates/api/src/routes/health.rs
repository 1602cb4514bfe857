use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: &'static str,
    /// `connected` when the generation engine answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comfyui: Option<String>,
    /// Probe error when the engine did not answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix epoch seconds.
    pub timestamp: f64,
}

/// GET /health -- reports whether the generation engine is reachable.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let report = relay_comfyui::health::check(state.orchestrator.engine()).await;
    let timestamp = relay_core::job::epoch_seconds();

    if report.healthy {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                comfyui: Some(report.detail),
                error: None,
                timestamp,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                comfyui: None,
                error: Some(report.detail),
                timestamp,
            }),
        )
    }
}

/// Mount health check routes. `/ping` is the hosting platform's liveness
/// probe and shares the handler.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ping", get(health_check))
}
