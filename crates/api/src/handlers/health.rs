//! `GET /v1/health` and `GET /v1/ready` (§6a): process liveness/readiness,
//! matching the teacher's own health/ready endpoints. Public; no `AuthUser`.

use std::sync::Arc;

use axum::{Json, extract::State};

use iqrah_backend_domain::{HealthResponse, ReadyResponse};
use iqrah_backend_storage::check_connection;

use crate::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_sha: option_env!("BUILD_SHA").unwrap_or("dev").to_string(),
        uptime_seconds: uptime,
    })
}

pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    let db_status = match check_connection(&state.pool).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Json(ReadyResponse {
        status: if db_status == "connected" { "ok" } else { "degraded" }.to_string(),
        database: db_status.to_string(),
    })
}
