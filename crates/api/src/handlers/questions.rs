//! `POST /v1/questions/fetch` (§6a): Batch Picker (§4.7), binding a session
//! via the Session Tracker (§4.10).

use std::sync::Arc;

use axum::{Json, extract::State};
use validator::Validate;

use iqrah_backend_domain::{FetchQuestionsRequest, FetchQuestionsResponse, QuestionDto, SessionContext};
use iqrah_backend_engine::normalize::{normalize_metadata, title_case};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

fn to_dto(q: iqrah_backend_domain::Question) -> QuestionDto {
    QuestionDto {
        id: q.id,
        subject: title_case(&q.subject),
        topic: title_case(&q.topic),
        subtopic: title_case(&q.subtopic),
        grade: q.grade,
        difficulty: q.difficulty,
        stem: q.stem,
        options: q.options,
        rationale: q.rationale,
        standard_ref: q.standard_ref,
    }
}

pub async fn fetch_questions(
    State(state): State<Arc<AppState>>,
    AuthUser(learner_id): AuthUser,
    Json(req): Json<FetchQuestionsRequest>,
) -> Result<Json<FetchQuestionsResponse>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    tracing::info!(%learner_id, subject = %req.subject, grade = req.grade, "fetching question batch");

    let result = state
        .engine
        .fetch_batch(
            learner_id,
            &req.subject,
            req.grade,
            req.topic.as_deref(),
            req.subtopic.as_deref(),
            req.limit,
        )
        .await
        .map_err(ApiError::Engine)?;

    let context = SessionContext {
        subject: Some(normalize_metadata(&req.subject)),
        topic: Some(result.resolved_topic.clone()),
        subtopic: Some(result.resolved_subtopic.clone()),
    };
    let session = state.engine.ensure_session(learner_id, context).await.map_err(ApiError::Engine)?;

    Ok(Json(FetchQuestionsResponse {
        questions: result.questions.into_iter().map(to_dto).collect(),
        resolved_subject: title_case(&normalize_metadata(&req.subject)),
        resolved_topic: title_case(&result.resolved_topic),
        resolved_subtopic: Some(title_case(&result.resolved_subtopic)),
        session_id: session.id,
        deficit: result.deficit,
    }))
}
