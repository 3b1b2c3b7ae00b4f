//! Assembles an unseen, difficulty-ranked batch for a caller and reports
//! inventory deficit (C7, §4.7).

use std::sync::Arc;

use uuid::Uuid;

use iqrah_backend_domain::{Difficulty, EngineError, JobKey, Question};

use crate::coordinator::CoordinatorHandle;
use crate::difficulty::preference_order;
use crate::normalize::normalize_metadata;
use crate::ports::{CurriculumCatalog, InventoryStore};
use crate::selector::select_subtopic;

/// `(batch, resolved_topic, resolved_subtopic, deficit)` (§4.7 step 8).
pub struct BatchResult {
    pub questions: Vec<Question>,
    pub resolved_topic: String,
    pub resolved_subtopic: String,
    pub deficit: u32,
}

#[allow(clippy::too_many_arguments)]
pub async fn fetch_batch(
    store: &Arc<dyn InventoryStore>,
    catalog: &Arc<dyn CurriculumCatalog>,
    coordinator: &CoordinatorHandle,
    learner_id: Uuid,
    subject: &str,
    grade: i16,
    topic: Option<&str>,
    subtopic: Option<&str>,
    limit: u32,
    min_stock: u32,
) -> Result<BatchResult, EngineError> {
    let subject = normalize_metadata(subject);

    let resolved_topic = match topic {
        Some(t) => normalize_metadata(t),
        None => catalog
            .first_topic(&subject, grade)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("no topic available for subject {subject}")))?,
    };

    let resolved_subtopic = match subtopic {
        Some(s) => normalize_metadata(s),
        None => select_subtopic(store, learner_id, &subject, grade, &resolved_topic)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("no subtopic catalog for {subject}/{resolved_topic}")))?,
    };

    let accuracy = store.accuracy_summary(learner_id).await?;
    let preference = preference_order(&accuracy);

    let seen = store.get_learner_seen(learner_id).await?;

    let mut batch = Vec::new();
    let mut remaining = limit;
    for difficulty in &preference {
        if remaining == 0 {
            break;
        }
        let picked = store
            .list_questions(&subject, grade, &resolved_topic, &resolved_subtopic, std::slice::from_ref(difficulty), &seen, remaining)
            .await?;
        remaining = remaining.saturating_sub(picked.len() as u32);
        batch.extend(picked);
    }

    let stock = store.count_questions(&subject, grade, &resolved_topic, &resolved_subtopic).await?;
    let deficit = (min_stock as i64 - stock).max(0) as u32;

    if deficit > 0 {
        let preferred_difficulty = preference.first().copied().unwrap_or(Difficulty::Easy);
        let key = JobKey {
            subject: subject.clone(),
            topic: resolved_topic.clone(),
            subtopic: resolved_subtopic.clone(),
            difficulty: preferred_difficulty,
            grade,
        };
        coordinator.submit(key, deficit).await;
    }

    Ok(BatchResult { questions: batch, resolved_topic, resolved_subtopic, deficit })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{spawn_coordinator, CoordinatorConfig};
    use crate::ports::StaticCurriculumCatalog;
    use crate::testing::{InMemoryStore, MockGenerator};
    use tokio_util::sync::CancellationToken;

    fn setup(store: InMemoryStore) -> (Arc<dyn InventoryStore>, Arc<dyn CurriculumCatalog>, CoordinatorHandle, CancellationToken) {
        let store: Arc<dyn InventoryStore> = Arc::new(store);
        let catalog: Arc<dyn CurriculumCatalog> =
            Arc::new(StaticCurriculumCatalog::new().with_topics("math", 3, vec!["multiplication".into()]));
        let generator = Arc::new(MockGenerator::new());
        let cancellation = CancellationToken::new();
        let coordinator = spawn_coordinator(store.clone(), generator, CoordinatorConfig::default(), cancellation.clone());
        (store, catalog, coordinator, cancellation)
    }

    #[tokio::test]
    async fn fresh_learner_gets_most_populous_subtopic_and_no_deficit() {
        let store = InMemoryStore::new()
            .with_subtopic("math", 3, "multiplication", "s1", 1, 20)
            .with_subtopic("math", 3, "multiplication", "s2", 2, 5);
        let (store, catalog, coordinator, cancellation) = setup(store);

        let result = fetch_batch(&store, &catalog, &coordinator, Uuid::new_v4(), "math", 3, None, None, 5, 10)
            .await
            .unwrap();

        assert_eq!(result.resolved_subtopic, "s1");
        assert_eq!(result.questions.len(), 5);
        assert_eq!(result.deficit, 0);
        cancellation.cancel();
    }

    #[tokio::test]
    async fn deficit_is_reported_when_stock_below_floor() {
        let store = InMemoryStore::new().with_subtopic("math", 3, "multiplication", "s2", 2, 8);
        let (store, catalog, coordinator, cancellation) = setup(store);

        let result = fetch_batch(&store, &catalog, &coordinator, Uuid::new_v4(), "math", 3, None, Some("s2"), 5, 10)
            .await
            .unwrap();

        assert_eq!(result.deficit, 2);
        cancellation.cancel();
    }

    #[tokio::test]
    async fn seen_questions_are_excluded() {
        let store = InMemoryStore::new().with_subtopic("math", 3, "multiplication", "s1", 1, 3);
        let learner = Uuid::new_v4();
        let excluded_fingerprint = "synthetic-math-multiplication-s1-0".to_string();
        let store = store.with_seen(learner, &excluded_fingerprint);
        let (store, catalog, coordinator, cancellation) = setup(store);

        let result = fetch_batch(&store, &catalog, &coordinator, learner, "math", 3, None, Some("s1"), 10, 10)
            .await
            .unwrap();

        assert!(result.questions.iter().all(|q| q.fingerprint != excluded_fingerprint));
        cancellation.cancel();
    }
}
