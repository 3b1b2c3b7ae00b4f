//! Auth claim shape consumed by the `AuthUser` extractor.
//!
//! The core never verifies a token itself — that is the external
//! collaborator named in §6 — it only trusts an already-verified subject
//! claim. Concrete token issuance (Google OAuth exchange, session login,
//! etc.) is out of scope.

use serde::{Deserialize, Serialize};

/// Verified bearer claims: the caller's authenticated learner id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // learner_id
    pub exp: u64,    // expiration timestamp
    pub iat: u64,    // issued at
}
