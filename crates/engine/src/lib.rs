//! Adaptive Question Dispatch & Replenishment Engine.
//!
//! This crate holds the core subject of the specification: C1 through C10.
//! Collaborators (store, generator, curriculum catalog, clock) are passed in
//! at construction rather than reached for as globals (§9's "ad-hoc global
//! singletons become explicit dependencies" redesign cue) so the whole
//! engine is deterministic to test without a live Postgres or LLM.

pub mod attempt_ledger;
pub mod batch_picker;
pub mod coordinator;
pub mod difficulty;
pub mod fingerprint;
pub mod normalize;
pub mod ports;
pub mod selector;
pub mod session;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use iqrah_backend_domain::{EngineError, Session, SessionContext, SubtopicCatalogEntry};

pub use batch_picker::BatchResult;
pub use coordinator::{CoordinatorConfig, CoordinatorHandle, spawn_coordinator};
pub use ports::{Clock, CurriculumCatalog, InventoryStore, QuestionGenerator, StaticCurriculumCatalog, SystemClock};

use attempt_ledger::{GradingOutcome, Progress};
use normalize::normalize_metadata;
use session::SessionSummary;

/// Tunables the Batch Picker needs beyond the coordinator's own config
/// (§6: `MIN_STOCK`, `SYNC_WAIT_MS`).
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub min_stock: u32,
    /// Caller-facing bounded wait when a fetch comes back empty (§4.7 edge
    /// policy). Zero means eager return, the default.
    pub sync_wait_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { min_stock: 10, sync_wait_ms: 0 }
    }
}

/// The single entry point the HTTP surface (or any other caller) talks to.
/// Bundles the store, curriculum catalog, and generation coordinator handle
/// the way §9 describes: `(store, generator, clock, rng, config)` wired
/// once at process start and shared thereafter.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn InventoryStore>,
    catalog: Arc<dyn CurriculumCatalog>,
    coordinator: CoordinatorHandle,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        catalog: Arc<dyn CurriculumCatalog>,
        coordinator: CoordinatorHandle,
        config: EngineConfig,
    ) -> Self {
        Self { store, catalog, coordinator, config }
    }

    /// Batch Picker (§4.7). Applies the bounded synchronous wait (edge
    /// policy) when the first pass comes back empty and `sync_wait_ms > 0`;
    /// otherwise returns eagerly, which is the default.
    pub async fn fetch_batch(
        &self,
        learner_id: Uuid,
        subject: &str,
        grade: i16,
        topic: Option<&str>,
        subtopic: Option<&str>,
        limit: u32,
    ) -> Result<BatchResult, EngineError> {
        let result = batch_picker::fetch_batch(
            &self.store,
            &self.catalog,
            &self.coordinator,
            learner_id,
            subject,
            grade,
            topic,
            subtopic,
            limit,
            self.config.min_stock,
        )
        .await?;

        if result.questions.is_empty() && self.config.sync_wait_ms > 0 {
            let deadline = tokio::time::Instant::now() + Duration::from_millis(self.config.sync_wait_ms);
            while tokio::time::Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let retry = batch_picker::fetch_batch(
                    &self.store,
                    &self.catalog,
                    &self.coordinator,
                    learner_id,
                    subject,
                    grade,
                    Some(&result.resolved_topic),
                    Some(&result.resolved_subtopic),
                    limit,
                    self.config.min_stock,
                )
                .await?;
                if !retry.questions.is_empty() {
                    return Ok(retry);
                }
            }
        }

        Ok(result)
    }

    /// Attempt Ledger `submit_attempt` (§4.9 steps 1-3).
    pub async fn submit_attempt(
        &self,
        learner_id: Uuid,
        question_id: Uuid,
        selected: &str,
        elapsed_ms: i64,
    ) -> Result<GradingOutcome, EngineError> {
        attempt_ledger::submit_attempt(&self.store, learner_id, question_id, selected, elapsed_ms).await
    }

    /// Attempt Ledger `progress` (§4.9).
    pub async fn progress(&self, learner_id: Uuid) -> Result<Progress, EngineError> {
        attempt_ledger::progress(&self.store, learner_id).await
    }

    /// Session Tracker `ensure_session` (§4.10).
    pub async fn ensure_session(&self, learner_id: Uuid, context: SessionContext) -> Result<Session, EngineError> {
        session::ensure_session(&self.store, learner_id, context).await
    }

    /// Session Tracker `end_session` (§4.10).
    pub async fn end_session(&self, session_id: Uuid) -> Result<Session, EngineError> {
        session::end_session(&self.store, session_id).await
    }

    /// Look up a session without mutating it, used by handlers to check
    /// ownership before acting on a session id.
    pub async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, EngineError> {
        self.store.get_session(session_id).await
    }

    /// Session Tracker `summary` (§4.10).
    pub async fn session_summary(&self, session_id: Uuid) -> Result<SessionSummary, EngineError> {
        session::summary(&self.store, session_id).await
    }

    /// `list_subtopics` + C3 query-time normalization (§6a browse route).
    pub async fn list_subtopics(
        &self,
        subject: &str,
        grade: i16,
        topic: Option<&str>,
    ) -> Result<Vec<SubtopicCatalogEntry>, EngineError> {
        let subject = normalize_metadata(subject);
        let topic = topic.map(normalize_metadata);
        self.store.list_subtopics(&subject, grade, topic.as_deref()).await
    }
}
