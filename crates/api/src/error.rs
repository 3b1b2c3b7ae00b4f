//! HTTP-layer error wrapper (C11, §4a).
//!
//! `EngineError` (§7a) is the core's own taxonomy and stays exactly as
//! specified there. Two failure modes belong to the HTTP edge instead of the
//! core: malformed wire DTOs (caught by `validator` before the engine ever
//! sees the request) and cross-learner access attempts (§6a: "a caller
//! cannot query or mutate another learner's data"). `ApiError` carries both
//! alongside a pass-through for `EngineError`, in the teacher's
//! `DomainError` style of one edge-level error enum with its own
//! `IntoResponse`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use iqrah_backend_domain::{EngineError, ErrorResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<String>),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ApiError {
    /// Flatten `validator::ValidationErrors` into field-qualified messages,
    /// matching the teacher's `DomainError::from_validation_errors`.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    format!(
                        "{}: {}",
                        field,
                        error.message.as_ref().unwrap_or(&std::borrow::Cow::Borrowed("validation failed"))
                    )
                })
            })
            .collect();
        ApiError::Validation(messages)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(details) => {
                let body = ErrorResponse { error: "validation failed".to_string(), details: Some(details) };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Forbidden(reason) => {
                let body = ErrorResponse { error: reason, details: None };
                (StatusCode::FORBIDDEN, Json(body)).into_response()
            }
            ApiError::Engine(err) => err.into_response(),
        }
    }
}
