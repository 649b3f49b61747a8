use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Liveness probe
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "lookalike-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness probe. Remote collaborators are not contacted; this only reports
/// how the session was wired.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let presenter = state.session.presenter();
    let image_directory = if presenter.image_directory().is_dir() {
        "ready"
    } else {
        "missing"
    };

    Json(json!({
        "status": "ready",
        "service": "lookalike-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "num_neighbors": state.session.num_neighbors(),
        "components": {
            "api": "ready",
            "embedding": "configured",
            "index": "configured",
            "image_directory": image_directory,
        }
    }))
}
