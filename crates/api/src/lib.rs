//! Iqrah adaptive practice server library: C11 (HTTP Surface, §4a) wired
//! against the `iqrah-backend-engine` core (C1-C10).

pub mod error;
pub mod generator;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use iqrah_backend_config::AppConfig;
use iqrah_backend_engine::Engine;

/// Application state shared across handlers. The engine bundles the store,
/// curriculum catalog, and generation coordinator handle (§9's "explicit
/// dependencies" redesign cue); handlers never reach past it to the store
/// directly. `pool` is kept only for the `/v1/ready` liveness check.
#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub pool: PgPool,
    pub config: AppConfig,
    pub start_time: Instant,
}

/// Build the versioned router (§6a). Every non-health route requires the
/// `AuthUser` extractor; `learner_id` always comes from the verified
/// subject claim, never the request body.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health::health))
        .route("/v1/ready", get(handlers::health::ready))
        .route("/v1/questions/fetch", post(handlers::questions::fetch_questions))
        .route("/v1/attempts", post(handlers::attempts::submit_attempt))
        .route("/v1/learners/{id}/progress", get(handlers::progress::get_progress))
        .route("/v1/sessions/{id}/end", post(handlers::sessions::end_session))
        .route("/v1/sessions/{id}/summary", get(handlers::sessions::session_summary))
        .route("/v1/subtopics", get(handlers::subtopics::list_subtopics))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
