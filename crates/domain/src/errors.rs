//! Engine error taxonomy with HTTP status code mappings.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

/// API error response format.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Distinct reasons a candidate question fails admission (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    MalformedOptions,
    AnswerNotInOptions,
    EmptyStem,
    BadDifficulty,
    BadGrade,
    MissingMetadata,
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValidationKind::MalformedOptions => "malformed_options",
            ValidationKind::AnswerNotInOptions => "answer_not_in_options",
            ValidationKind::EmptyStem => "empty_stem",
            ValidationKind::BadDifficulty => "bad_difficulty",
            ValidationKind::BadGrade => "bad_grade",
            ValidationKind::MissingMetadata => "missing_metadata",
        };
        f.write_str(s)
    }
}

/// The engine's public error taxonomy (§7, concrete form in §7a).
///
/// `DuplicateFingerprint`, `ActiveSessionExists`, `GeneratorTransient` and
/// `GeneratorPermanent` are deliberately absent: per §7 they never reach a
/// caller as an error, only as ordinary return values (accepted/skipped
/// counts, the winning session, a job's terminal state).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Resource not found (404 Not Found).
    #[error("not found: {0}")]
    NotFound(String),

    /// Attempt submitted against a question id the store has no record of (404).
    #[error("unknown question: {0}")]
    UnknownQuestion(Uuid),

    /// Caller-submitted data failed structural/semantic validation (400).
    #[error("validation failed: {0}")]
    Validation(ValidationKind),

    /// The inventory store is unavailable; no in-memory fallback (500).
    #[error("store unavailable")]
    Store(#[from] sqlx::Error),

    /// Anything else, confined to process wiring and config loading (500).
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl EngineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::NotFound(_) | EngineError::UnknownQuestion(_) => StatusCode::NOT_FOUND,
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::Store(_) | EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if matches!(self, EngineError::Store(_) | EngineError::Internal(_)) {
            tracing::error!(error = %self, "internal engine error");
        }

        let body = match &self {
            EngineError::Validation(kind) => ErrorResponse {
                error: "validation failed".to_string(),
                details: Some(vec![kind.to_string()]),
            },
            _ => ErrorResponse {
                error: self.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
