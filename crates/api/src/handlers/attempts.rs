//! `POST /v1/attempts` (§6a): Attempt Ledger `submit_attempt` (§4.9), which
//! also ensures the caller has an open session to bind the attempt to.

use std::sync::Arc;

use axum::{Json, extract::State};
use validator::Validate;

use iqrah_backend_domain::{SessionContext, SubmitAttemptRequest, SubmitAttemptResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

pub async fn submit_attempt(
    State(state): State<Arc<AppState>>,
    AuthUser(learner_id): AuthUser,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<Json<SubmitAttemptResponse>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let outcome = state
        .engine
        .submit_attempt(learner_id, req.question_id, &req.selected, req.elapsed_ms)
        .await
        .map_err(ApiError::Engine)?;

    // §4.9 step 4: trigger the Session Tracker to ensure an open session.
    // The attempt itself does not carry a curricular scope, so the session
    // context here is learner-scoped only, consistent with §4.10's "sessions
    // are learner-scoped, not topic-scoped."
    let session = state
        .engine
        .ensure_session(learner_id, SessionContext::default())
        .await
        .map_err(ApiError::Engine)?;

    tracing::info!(%learner_id, question_id = %req.question_id, correct = outcome.correct, "attempt graded");

    Ok(Json(SubmitAttemptResponse {
        attempt_id: outcome.attempt_id,
        correct: outcome.correct,
        correct_answer: outcome.correct_answer,
        session_id: session.id,
    }))
}
