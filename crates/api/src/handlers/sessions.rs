//! `POST /v1/sessions/{id}/end` and `GET /v1/sessions/{id}/summary` (§6a):
//! Session Tracker `end_session`/`summary` (§4.10).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use iqrah_backend_domain::{SessionDto, SessionSummaryResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

fn to_dto(session: iqrah_backend_domain::Session) -> SessionDto {
    SessionDto {
        id: session.id,
        learner_id: session.learner_id,
        subject: session.subject,
        topic: session.topic,
        subtopic: session.subtopic,
        started_at: session.started_at,
        ended_at: session.ended_at,
    }
}

/// A session only belongs to the caller who opened it; this is the same
/// cross-learner guard the progress handler applies (§6a).
async fn require_owned_session(
    state: &AppState,
    learner_id: Uuid,
    session_id: Uuid,
) -> Result<(), ApiError> {
    let session = state
        .engine
        .get_session(session_id)
        .await
        .map_err(ApiError::Engine)?
        .ok_or_else(|| ApiError::Engine(iqrah_backend_domain::EngineError::NotFound(format!("session {session_id}"))))?;

    if session.learner_id != learner_id {
        return Err(ApiError::Forbidden("cannot act on another learner's session".to_string()));
    }
    Ok(())
}

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    AuthUser(learner_id): AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionDto>, ApiError> {
    require_owned_session(&state, learner_id, session_id).await?;

    let session = state.engine.end_session(session_id).await.map_err(ApiError::Engine)?;
    Ok(Json(to_dto(session)))
}

pub async fn session_summary(
    State(state): State<Arc<AppState>>,
    AuthUser(learner_id): AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    require_owned_session(&state, learner_id, session_id).await?;

    let summary = state.engine.session_summary(session_id).await.map_err(ApiError::Engine)?;

    Ok(Json(SessionSummaryResponse {
        session: to_dto(summary.session),
        questions_attempted: summary.questions_attempted,
        questions_correct: summary.questions_correct,
        accuracy_pct: summary.accuracy_pct,
        total_elapsed_ms: summary.total_elapsed_ms,
        avg_elapsed_ms: summary.avg_elapsed_ms,
        subjects_practiced: summary.subjects_practiced,
    }))
}
