//! Picks the next subtopic when the caller does not pin one (C5, §4.5).

use std::sync::Arc;

use uuid::Uuid;

use iqrah_backend_domain::EngineError;

use crate::ports::InventoryStore;

/// Choose a subtopic for `(learner_id, subject, grade, topic)`: prefer the
/// subtopic with the most unseen material for this learner, tiebreaking by
/// curricular sequence then lexicographic name. Returns `None` if the
/// catalog is empty for that scope.
pub async fn select_subtopic(
    store: &Arc<dyn InventoryStore>,
    learner_id: Uuid,
    subject: &str,
    grade: i16,
    topic: &str,
) -> Result<Option<String>, EngineError> {
    let catalog = store.list_subtopics(subject, grade, Some(topic)).await?;
    if catalog.is_empty() {
        return Ok(None);
    }

    let mut ranked = Vec::with_capacity(catalog.len());
    for entry in &catalog {
        let stock = store
            .count_questions(subject, grade, topic, &entry.subtopic)
            .await?;
        let seen_in_scope = store
            .count_seen_in_subtopic(learner_id, subject, grade, topic, &entry.subtopic)
            .await?;
        let unseen_count = (stock - seen_in_scope).max(0);
        ranked.push((unseen_count, entry.sequence_order, entry.subtopic.clone()));
    }

    ranked.sort_by(|a, b| {
        b.0.cmp(&a.0) // unseen_count descending
            .then(a.1.cmp(&b.1)) // sequence_order ascending
            .then(a.2.cmp(&b.2)) // subtopic lexicographic ascending
    });

    Ok(ranked.into_iter().next().map(|(_, _, subtopic)| subtopic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    #[tokio::test]
    async fn prefers_subtopic_with_most_unseen() {
        let store: Arc<dyn InventoryStore> = Arc::new(
            InMemoryStore::new()
                .with_subtopic("math", 3, "multiplication", "s1", 1, 20)
                .with_subtopic("math", 3, "multiplication", "s2", 2, 5),
        );
        let chosen = select_subtopic(&store, Uuid::new_v4(), "math", 3, "multiplication")
            .await
            .unwrap();
        assert_eq!(chosen, Some("s1".to_string()));
    }

    #[tokio::test]
    async fn ties_break_by_sequence_order() {
        let store: Arc<dyn InventoryStore> = Arc::new(
            InMemoryStore::new()
                .with_subtopic("math", 3, "multiplication", "s2", 2, 5)
                .with_subtopic("math", 3, "multiplication", "s1", 1, 5),
        );
        let chosen = select_subtopic(&store, Uuid::new_v4(), "math", 3, "multiplication")
            .await
            .unwrap();
        assert_eq!(chosen, Some("s1".to_string()));
    }

    #[tokio::test]
    async fn empty_catalog_yields_none() {
        let store: Arc<dyn InventoryStore> = Arc::new(InMemoryStore::new());
        let chosen = select_subtopic(&store, Uuid::new_v4(), "math", 3, "multiplication")
            .await
            .unwrap();
        assert_eq!(chosen, None);
    }
}
