//! `AuthUser` extractor (C11, §4a). The core never verifies a token itself —
//! that is the external collaborator named in §6 — it only trusts an
//! already-verified subject claim. This extractor decodes a bearer JWT's
//! `sub` claim as the learner id; swapping in a different issuance scheme
//! (Google ID-token exchange, session cookies, …) means replacing only this
//! file.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use iqrah_backend_domain::{Claims, ErrorResponse};

use crate::AppState;

/// Extract and verify a learner id from the `Authorization` header.
fn verify_bearer_token(headers: &HeaderMap, jwt_secret: &str) -> Result<Uuid, StatusCode> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header.strip_prefix("Bearer ").ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(jwt_secret.as_bytes()), &Validation::default())
        .map_err(|e| {
            tracing::warn!(error = %e, "bearer token verification failed");
            StatusCode::UNAUTHORIZED
        })?;

    token_data.claims.sub.parse::<Uuid>().map_err(|_| StatusCode::UNAUTHORIZED)
}

/// The authenticated caller's learner id (§4a: "each core operation
/// receives an already-authenticated `learner_id`").
pub struct AuthUser(pub Uuid);

/// A minimal rejection — auth failures never surface the engine's own error
/// taxonomy (§7a), since verification is entirely outside the core.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = ErrorResponse { error: "unauthorized".to_string(), details: None };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        verify_bearer_token(&parts.headers, &state.config.jwt_secret)
            .map(AuthUser)
            .map_err(|_| AuthRejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(learner_id: Uuid, secret: &str) -> String {
        let claims = Claims { sub: learner_id.to_string(), exp: 9_999_999_999, iat: 0 };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn accepts_a_validly_signed_bearer_token() {
        let learner = Uuid::new_v4();
        let token = token_for(learner, "test-secret");
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {token}").parse().unwrap());

        let extracted = verify_bearer_token(&headers, "test-secret").unwrap();
        assert_eq!(extracted, learner);
    }

    #[test]
    fn rejects_a_token_signed_with_a_different_secret() {
        let token = token_for(Uuid::new_v4(), "other-secret");
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", format!("Bearer {token}").parse().unwrap());

        assert!(verify_bearer_token(&headers, "test-secret").is_err());
    }

    #[test]
    fn rejects_a_missing_header() {
        let headers = HeaderMap::new();
        assert!(verify_bearer_token(&headers, "test-secret").is_err());
    }
}
