//! `GET /v1/learners/{id}/progress` (§6a): Attempt Ledger `progress` (§4.9).

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Json, extract::{Path, State}};
use uuid::Uuid;

use iqrah_backend_domain::{ProgressResponse, SubjectProgress};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    AuthUser(learner_id): AuthUser,
    Path(path_learner_id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, ApiError> {
    // §6a: "learner_id is taken from the verified subject claim, never from
    // the request body, so a caller cannot query ... another learner's
    // data." The path segment must match the authenticated caller.
    if path_learner_id != learner_id {
        return Err(ApiError::Forbidden("cannot view another learner's progress".to_string()));
    }

    let progress = state.engine.progress(learner_id).await.map_err(ApiError::Engine)?;

    let by_subject: BTreeMap<String, SubjectProgress> = progress
        .by_subject
        .into_iter()
        .map(|(subject, p)| (subject, SubjectProgress { attempted: p.attempted, correct: p.correct, accuracy_pct: p.accuracy_pct }))
        .collect();

    Ok(Json(ProgressResponse {
        attempted: progress.attempted,
        correct: progress.correct,
        accuracy_pct: progress.accuracy_pct,
        current_streak: progress.current_streak,
        by_subject,
    }))
}
