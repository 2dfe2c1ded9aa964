//! Health and metrics endpoints.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, http::header, response::IntoResponse};

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running. Does not contact the
/// sequencer.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Prometheus scrape endpoint.
///
/// Returns 404 when the server runs without a metrics recorder.
///
/// # Endpoint
///
/// ```text
/// GET /metrics
/// ```
#[allow(clippy::unused_async)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/plain")],
            "metrics are disabled".to_string(),
        ),
    }
}
