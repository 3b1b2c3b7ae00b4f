//! `GET /v1/subtopics` (§6a): `list_subtopics` plus the C3 display
//! normalization every read-out applies.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use validator::Validate;

use iqrah_backend_domain::{ListSubtopicsQuery, SubtopicDto};
use iqrah_backend_engine::normalize::title_case;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

pub async fn list_subtopics(
    State(state): State<Arc<AppState>>,
    AuthUser(_learner_id): AuthUser,
    Query(query): Query<ListSubtopicsQuery>,
) -> Result<Json<Vec<SubtopicDto>>, ApiError> {
    query.validate().map_err(ApiError::from_validation_errors)?;

    let entries = state
        .engine
        .list_subtopics(&query.subject, query.grade, query.topic.as_deref())
        .await
        .map_err(ApiError::Engine)?;

    let dtos = entries
        .into_iter()
        .map(|e| SubtopicDto {
            subject: title_case(&e.subject),
            topic: title_case(&e.topic),
            subtopic: title_case(&e.subtopic),
            sequence_order: e.sequence_order,
            description: e.description,
        })
        .collect();

    Ok(Json(dtos))
}
