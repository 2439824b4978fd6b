//! Health check handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub records: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    pub instances: usize,
}

/// GET /health - Liveness probe (fast, no dependencies)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "gate-api",
    })
}

/// GET /ready - Readiness probe (records loaded)
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, StatusCode> {
    let instances = state.records.instance_count();

    if instances > 0 {
        Ok(Json(ReadyResponse {
            status: "ready",
            service: "gate-api",
            checks: ReadyChecks {
                records: CheckResult {
                    status: "ok",
                    instances,
                },
            },
        }))
    } else {
        // Nothing to gate yet
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}
