//! Health check endpoints

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    mongodb: bool,
}

/// Create a health check router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(readiness_check))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: state.config.app.name,
        version: state.config.app.version,
    })
}

/// Readiness check - verifies the MongoDB connection
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let mongodb = database::mongodb::check_health_detailed(&state.mongo_client).await;

    if !mongodb.healthy {
        tracing::warn!(
            response_time_ms = mongodb.response_time_ms,
            "MongoDB readiness probe failed: {:?}",
            mongodb.message
        );
    }

    let status = if mongodb.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyResponse {
            status: if mongodb.healthy { "ready" } else { "unhealthy" },
            mongodb: mongodb.healthy,
        }),
    )
}
