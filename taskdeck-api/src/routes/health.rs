/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "storage": "connected",
///   "timestamp": "2025-01-01T00:00:00.000Z"
/// }
/// ```
use crate::app::AppState;
use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when storage is unreachable
    pub status: String,

    /// Application version
    pub version: String,

    /// Storage status
    pub storage: String,

    pub timestamp: String,
}

/// Health check handler
///
/// Always answers 200; the body reports storage connectivity.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage_ready = state.tasks.storage_ready().await;
    if !storage_ready {
        tracing::warn!("Health check: storage unreachable");
    }

    Json(HealthResponse {
        status: if storage_ready { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: if storage_ready { "connected" } else { "disconnected" }.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
