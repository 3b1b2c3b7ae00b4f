//! Wiring for the `QuestionGenerator` seam (§6's external Generator
//! collaborator). The concrete LLM provider is explicitly out of scope
//! (§1) — this module only decides, at process start, which implementation
//! backs the seam: the deterministic in-memory double when
//! `MOCK_GENERATOR=true` (§6, §4a), or a stub that fails permanently and
//! names the missing configuration otherwise. A real provider integration
//! replaces only this file, the same way `GoogleIdTokenVerifier` is the
//! sole seam for token issuance.

use async_trait::async_trait;

use iqrah_backend_domain::{GenerationContext, GeneratedQuestion, GeneratorError};
use iqrah_backend_engine::QuestionGenerator;

/// Returned when `MOCK_GENERATOR=false` and no real provider has been wired
/// in. Fails every job permanently rather than retrying forever against a
/// collaborator that was never configured.
pub struct UnconfiguredGenerator;

#[async_trait]
impl QuestionGenerator for UnconfiguredGenerator {
    async fn generate(&self, _ctx: &GenerationContext) -> Result<Vec<GeneratedQuestion>, GeneratorError> {
        Err(GeneratorError::Permanent(
            "no question generator provider is configured; set MOCK_GENERATOR=true or wire a real QuestionGenerator".to_string(),
        ))
    }
}
