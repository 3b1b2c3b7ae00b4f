//! Opens/closes sessions per learner and computes summary statistics
//! (C10, §4.10).

use std::sync::Arc;

use uuid::Uuid;

use iqrah_backend_domain::{EngineError, Session, SessionContext};

use crate::normalize::title_case;
use crate::ports::InventoryStore;

/// `ensure_session` (§4.10): idempotent over the active window. C4's
/// `open_session` already implements "return the active session if one
/// exists, else open one" (§4.4), so this is a thin, named pass-through —
/// the seam the rest of the engine calls instead of reaching into the store
/// directly.
pub async fn ensure_session(
    store: &Arc<dyn InventoryStore>,
    learner_id: Uuid,
    context: SessionContext,
) -> Result<Session, EngineError> {
    store.open_session(learner_id, &context).await
}

/// `end_session` (§4.10): idempotent; returns the final record. `NotFound`
/// only if the id never existed.
pub async fn end_session(store: &Arc<dyn InventoryStore>, session_id: Uuid) -> Result<Session, EngineError> {
    store
        .end_session(session_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("session {session_id}")))
}

/// Computed summary of a session's attempts (§4.10).
pub struct SessionSummary {
    pub session: Session,
    pub questions_attempted: u64,
    pub questions_correct: u64,
    pub accuracy_pct: u32,
    pub total_elapsed_ms: i64,
    pub avg_elapsed_ms: i64,
    pub subjects_practiced: Vec<String>,
}

/// `summary(session_id)` (§4.10): computed from `session_attempts` over
/// `[started_at, ended_at ?? now]`.
pub async fn summary(store: &Arc<dyn InventoryStore>, session_id: Uuid) -> Result<SessionSummary, EngineError> {
    let session = store
        .get_session(session_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("session {session_id}")))?;

    let attempts = store.session_attempts(session_id).await?;

    let questions_attempted = attempts.len() as u64;
    let questions_correct = attempts.iter().filter(|a| a.correct).count() as u64;
    let total_elapsed_ms: i64 = attempts.iter().map(|a| a.elapsed_ms).sum();
    let avg_elapsed_ms = total_elapsed_ms / (questions_attempted.max(1) as i64);
    let accuracy_pct = if questions_attempted == 0 {
        0
    } else {
        (100.0 * questions_correct as f64 / questions_attempted as f64).round() as u32
    };

    let mut subjects_practiced: Vec<String> = attempts.iter().map(|a| title_case(&a.subject)).collect();
    subjects_practiced.sort();
    subjects_practiced.dedup();

    Ok(SessionSummary {
        session,
        questions_attempted,
        questions_correct,
        accuracy_pct,
        total_elapsed_ms,
        avg_elapsed_ms,
        subjects_practiced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    #[tokio::test]
    async fn ensure_session_opens_once_then_returns_same_session() {
        let store: Arc<dyn InventoryStore> = Arc::new(InMemoryStore::new());
        let learner = Uuid::new_v4();
        let ctx = SessionContext { subject: Some("math".into()), topic: None, subtopic: None };

        let first = ensure_session(&store, learner, ctx.clone()).await.unwrap();
        let second = ensure_session(&store, learner, ctx).await.unwrap();

        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn end_session_is_idempotent() {
        let store: Arc<dyn InventoryStore> = Arc::new(InMemoryStore::new());
        let learner = Uuid::new_v4();
        let session = ensure_session(&store, learner, SessionContext::default()).await.unwrap();

        let ended_once = end_session(&store, session.id).await.unwrap();
        assert!(ended_once.ended_at.is_some());

        let ended_twice = end_session(&store, session.id).await.unwrap();
        assert_eq!(ended_once.ended_at, ended_twice.ended_at);
    }

    #[tokio::test]
    async fn end_session_unknown_id_is_not_found() {
        let store: Arc<dyn InventoryStore> = Arc::new(InMemoryStore::new());
        let err = end_session(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn summary_aggregates_session_attempts() {
        let store: Arc<dyn InventoryStore> = Arc::new(
            InMemoryStore::new().with_subtopic("math", 3, "multiplication", "s1", 1, 5),
        );
        let learner = Uuid::new_v4();
        let session = ensure_session(&store, learner, SessionContext { subject: Some("math".into()), topic: None, subtopic: None })
            .await
            .unwrap();

        let questions = store
            .list_questions("math", 3, "multiplication", "s1", &iqrah_backend_domain::Difficulty::ALL, &Default::default(), 2)
            .await
            .unwrap();

        store
            .record_attempt(learner, questions[0].id, &questions[0].fingerprint, "math", "a", true, 1000, true)
            .await
            .unwrap();
        store
            .record_attempt(learner, questions[1].id, &questions[1].fingerprint, "math", "b", false, 2000, true)
            .await
            .unwrap();

        let result = summary(&store, session.id).await.unwrap();
        assert_eq!(result.questions_attempted, 2);
        assert_eq!(result.questions_correct, 1);
        assert_eq!(result.accuracy_pct, 50);
        assert_eq!(result.total_elapsed_ms, 3000);
        assert_eq!(result.avg_elapsed_ms, 1500);
        assert_eq!(result.subjects_practiced, vec!["Math".to_string()]);
    }
}
