#![cfg(feature = "postgres-tests")]

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use iqrah_backend_domain::{Difficulty, Question, SessionContext};
use iqrah_backend_storage::InventoryRepository;

fn sample_question(subject: &str, topic: &str, subtopic: &str, fingerprint: &str) -> Question {
    Question {
        id: Uuid::new_v4(),
        subject: subject.to_string(),
        topic: topic.to_string(),
        subtopic: subtopic.to_string(),
        grade: 3,
        difficulty: Difficulty::Easy,
        stem: format!("stem for {fingerprint}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: "a".into(),
        rationale: String::new(),
        standard_ref: None,
        fingerprint: fingerprint.to_string(),
        created_at: Utc::now(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn admit_questions_is_idempotent_on_fingerprint_collision(pool: PgPool) -> Result<(), sqlx::Error> {
    let repo = InventoryRepository::new(pool);
    let q = sample_question("math", "multiplication", "s1", "fp-dup-1");

    let first = repo
        .admit_questions(std::slice::from_ref(&q))
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert_eq!(first.accepted, 1);
    assert_eq!(first.skipped, 0);

    let mut duplicate = q.clone();
    duplicate.id = Uuid::new_v4();
    let second = repo
        .admit_questions(std::slice::from_ref(&duplicate))
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert_eq!(second.accepted, 0, "second admission of the same fingerprint should write nothing new");
    assert_eq!(second.skipped, 1);

    let stock = repo
        .count_questions("math", 3, "multiplication", "s1")
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert_eq!(stock, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn record_attempt_marks_seen_only_on_correct(pool: PgPool) -> Result<(), sqlx::Error> {
    let repo = InventoryRepository::new(pool);
    let q = sample_question("math", "multiplication", "s1", "fp-seen-1");
    repo.admit_questions(std::slice::from_ref(&q))
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    let learner = Uuid::new_v4();

    repo.record_attempt(learner, q.id, &q.fingerprint, &q.subject, "b", false, 500, true)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    let seen = repo.get_learner_seen(learner).await.map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert!(seen.is_empty(), "an incorrect attempt must not mark the question seen");

    repo.record_attempt(learner, q.id, &q.fingerprint, &q.subject, "a", true, 700, true)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    let seen = repo.get_learner_seen(learner).await.map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert!(seen.contains(&q.fingerprint));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn concurrent_open_session_resolves_to_one_winner(pool: PgPool) -> Result<(), sqlx::Error> {
    let repo = InventoryRepository::new(pool);
    let learner = Uuid::new_v4();
    let ctx = SessionContext { subject: Some("math".into()), topic: None, subtopic: None };

    let mut handles = Vec::new();
    for _ in 0..5 {
        let repo = repo.clone();
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move { repo.open_session(learner, &ctx).await }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let session = handle.await.unwrap().map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        ids.insert(session.id);
    }

    assert_eq!(ids.len(), 1, "concurrent racers must resolve to a single session id");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn end_session_is_idempotent_and_preserves_ended_at(pool: PgPool) -> Result<(), sqlx::Error> {
    let repo = InventoryRepository::new(pool);
    let learner = Uuid::new_v4();
    let session = repo
        .open_session(learner, &SessionContext::default())
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    let ended_once = repo
        .end_session(session.id)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?
        .expect("session should exist");
    let ended_twice = repo
        .end_session(session.id)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?
        .expect("session should still exist");

    assert_eq!(ended_once.ended_at, ended_twice.ended_at);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_subtopics_orders_by_sequence_then_name(pool: PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO subtopics (subject, grade, topic, subtopic, sequence_order, description) VALUES
         ('math', 3, 'multiplication', 'zeta', 1, NULL),
         ('math', 3, 'multiplication', 'alpha', 1, NULL),
         ('math', 3, 'multiplication', 'beta', 2, NULL)",
    )
    .execute(&pool)
    .await?;

    let repo = InventoryRepository::new(pool);
    let entries = repo
        .list_subtopics("math", 3, Some("multiplication"))
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    let names: Vec<&str> = entries.iter().map(|e| e.subtopic.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta", "beta"]);

    Ok(())
}
