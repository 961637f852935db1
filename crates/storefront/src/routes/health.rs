//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode};

use crate::db::with_retry;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Runs `SELECT 1` through the retry wrapper, so a single dropped
/// connection does not flap the probe. Returns 503 Service Unavailable once
/// retries are exhausted or the failure is not transient.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let pool = state.pool();
    let result = with_retry(state.retry_policy(), || {
        sqlx::query("SELECT 1").execute(pool)
    })
    .await;

    match result {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
