//! Test doubles matching the teacher's `testing`-feature-gated mock style
//! (sibling `iqrah-core`'s `mockall`-backed repositories). Used by this
//! crate's own unit tests and available to downstream crates (`api`) under
//! the `testing` feature so handler tests don't need a live Postgres.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use iqrah_backend_domain::{
    AccuracySummary, AdmitOutcome, Attempt, Difficulty, EngineError, GenerationContext,
    GeneratedQuestion, GeneratorError, Question, Session, SessionContext, SubtopicCatalogEntry,
};

use crate::ports::{Clock, InventoryStore, QuestionGenerator};

#[derive(Default)]
struct Inner {
    questions: Vec<Question>,
    subtopics: Vec<SubtopicCatalogEntry>,
    seen: HashMap<Uuid, HashSet<String>>,
    attempts: Vec<Attempt>,
    sessions: HashMap<Uuid, Session>,
}

/// An in-process `InventoryStore` double backing every unit test in this
/// crate that does not require a real Postgres instance.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog entry and `stock` synthetic admitted questions for
    /// it, so `count_questions`/`list_questions` behave realistically
    /// without hand-authoring each row.
    pub fn with_subtopic(
        mut self,
        subject: &str,
        grade: i16,
        topic: &str,
        subtopic: &str,
        sequence_order: i32,
        stock: u32,
    ) -> Self {
        let inner = self.inner.get_mut().unwrap();
        inner.subtopics.push(SubtopicCatalogEntry {
            subject: subject.to_string(),
            grade,
            topic: topic.to_string(),
            subtopic: subtopic.to_string(),
            sequence_order,
            description: None,
        });

        for i in 0..stock {
            inner.questions.push(synthetic_question(subject, grade, topic, subtopic, i));
        }
        self
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.inner.get_mut().unwrap().questions.push(question);
        self
    }

    pub fn with_seen(mut self, learner_id: Uuid, fingerprint: &str) -> Self {
        self.inner
            .get_mut()
            .unwrap()
            .seen
            .entry(learner_id)
            .or_default()
            .insert(fingerprint.to_string());
        self
    }
}

fn synthetic_question(subject: &str, grade: i16, topic: &str, subtopic: &str, ordinal: u32) -> Question {
    let fingerprint = format!("synthetic-{subject}-{topic}-{subtopic}-{ordinal}");
    Question {
        id: Uuid::new_v4(),
        subject: subject.to_string(),
        topic: topic.to_string(),
        subtopic: subtopic.to_string(),
        grade,
        difficulty: Difficulty::ALL[ordinal as usize % 3],
        stem: format!("synthetic stem {ordinal}"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer: "a".into(),
        rationale: String::new(),
        standard_ref: None,
        fingerprint,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl InventoryStore for InMemoryStore {
    async fn list_questions(
        &self,
        subject: &str,
        grade: i16,
        topic: &str,
        subtopic: &str,
        difficulties: &[Difficulty],
        exclude_fingerprints: &HashSet<String>,
        limit: u32,
    ) -> Result<Vec<Question>, EngineError> {
        let inner = self.inner.lock().unwrap();
        let mut out = Vec::new();

        for difficulty in difficulties {
            if out.len() as u32 >= limit {
                break;
            }
            for q in &inner.questions {
                if out.len() as u32 >= limit {
                    break;
                }
                if q.subject == subject
                    && q.grade == grade
                    && q.topic == topic
                    && q.subtopic == subtopic
                    && &q.difficulty == difficulty
                    && !exclude_fingerprints.contains(&q.fingerprint)
                {
                    out.push(q.clone());
                }
            }
        }

        Ok(out)
    }

    async fn count_questions(&self, subject: &str, grade: i16, topic: &str, subtopic: &str) -> Result<i64, EngineError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .questions
            .iter()
            .filter(|q| q.subject == subject && q.grade == grade && q.topic == topic && q.subtopic == subtopic)
            .count() as i64)
    }

    async fn count_seen_in_subtopic(
        &self,
        learner_id: Uuid,
        subject: &str,
        grade: i16,
        topic: &str,
        subtopic: &str,
    ) -> Result<i64, EngineError> {
        let inner = self.inner.lock().unwrap();
        let Some(seen) = inner.seen.get(&learner_id) else {
            return Ok(0);
        };
        Ok(inner
            .questions
            .iter()
            .filter(|q| q.subject == subject && q.grade == grade && q.topic == topic && q.subtopic == subtopic)
            .filter(|q| seen.contains(&q.fingerprint))
            .count() as i64)
    }

    async fn list_subtopics(&self, subject: &str, grade: i16, topic: Option<&str>) -> Result<Vec<SubtopicCatalogEntry>, EngineError> {
        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<SubtopicCatalogEntry> = inner
            .subtopics
            .iter()
            .filter(|s| s.subject == subject && s.grade == grade && topic.is_none_or(|t| s.topic == t))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.sequence_order.cmp(&b.sequence_order).then(a.subtopic.cmp(&b.subtopic)));
        Ok(entries)
    }

    async fn admit_questions(&self, batch: &[Question]) -> Result<AdmitOutcome, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let mut outcome = AdmitOutcome::default();
        for q in batch {
            if inner.questions.iter().any(|existing| existing.fingerprint == q.fingerprint) {
                outcome.skipped += 1;
            } else {
                inner.questions.push(q.clone());
                outcome.accepted += 1;
            }
        }
        Ok(outcome)
    }

    async fn get_learner_seen(&self, learner_id: Uuid) -> Result<HashSet<String>, EngineError> {
        Ok(self.inner.lock().unwrap().seen.get(&learner_id).cloned().unwrap_or_default())
    }

    async fn get_question(&self, question_id: Uuid) -> Result<Option<Question>, EngineError> {
        Ok(self.inner.lock().unwrap().questions.iter().find(|q| q.id == question_id).cloned())
    }

    async fn record_attempt(
        &self,
        learner_id: Uuid,
        question_id: Uuid,
        fingerprint: &str,
        subject: &str,
        selected: &str,
        correct: bool,
        elapsed_ms: i64,
        mark_seen_if_correct: bool,
    ) -> Result<Attempt, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let attempt = Attempt {
            id: Uuid::new_v4(),
            learner_id,
            question_id,
            subject: subject.to_string(),
            selected: selected.to_string(),
            correct,
            elapsed_ms,
            created_at: Utc::now(),
        };
        inner.attempts.push(attempt.clone());
        if correct && mark_seen_if_correct {
            inner.seen.entry(learner_id).or_default().insert(fingerprint.to_string());
        }
        Ok(attempt)
    }

    async fn open_session(&self, learner_id: Uuid, context: &SessionContext) -> Result<Session, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.sessions.values().find(|s| s.learner_id == learner_id && s.is_active()) {
            return Ok(existing.clone());
        }
        let session = Session {
            id: Uuid::new_v4(),
            learner_id,
            subject: context.subject.clone(),
            topic: context.topic.clone(),
            subtopic: context.subtopic.clone(),
            started_at: Utc::now(),
            ended_at: None,
        };
        inner.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn end_session(&self, session_id: Uuid) -> Result<Option<Session>, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(session) = inner.sessions.get_mut(&session_id) {
            if session.is_active() {
                session.ended_at = Some(Utc::now());
            }
            return Ok(Some(session.clone()));
        }
        Ok(None)
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, EngineError> {
        Ok(self.inner.lock().unwrap().sessions.get(&session_id).cloned())
    }

    async fn session_attempts(&self, session_id: Uuid) -> Result<Vec<Attempt>, EngineError> {
        let inner = self.inner.lock().unwrap();
        let Some(session) = inner.sessions.get(&session_id) else {
            return Ok(Vec::new());
        };
        let window_end = session.ended_at.unwrap_or_else(Utc::now);
        Ok(inner
            .attempts
            .iter()
            .filter(|a| a.learner_id == session.learner_id && a.created_at >= session.started_at && a.created_at <= window_end)
            .cloned()
            .collect())
    }

    async fn accuracy_summary(&self, learner_id: Uuid) -> Result<AccuracySummary, EngineError> {
        let inner = self.inner.lock().unwrap();
        let relevant: Vec<&Attempt> = inner.attempts.iter().filter(|a| a.learner_id == learner_id).collect();
        Ok(AccuracySummary {
            total_attempts: relevant.len() as u64,
            total_correct: relevant.iter().filter(|a| a.correct).count() as u64,
        })
    }

    async fn subject_progress(&self, learner_id: Uuid) -> Result<Vec<(String, u64, u64)>, EngineError> {
        let inner = self.inner.lock().unwrap();
        let mut by_subject: HashMap<String, (u64, u64)> = HashMap::new();
        for a in inner.attempts.iter().filter(|a| a.learner_id == learner_id) {
            let entry = by_subject.entry(a.subject.clone()).or_default();
            entry.0 += 1;
            if a.correct {
                entry.1 += 1;
            }
        }
        Ok(by_subject.into_iter().map(|(subject, (attempted, correct))| (subject, attempted, correct)).collect())
    }

    async fn recent_attempts(&self, learner_id: Uuid, limit: i64) -> Result<Vec<Attempt>, EngineError> {
        let inner = self.inner.lock().unwrap();
        let mut relevant: Vec<Attempt> = inner.attempts.iter().filter(|a| a.learner_id == learner_id).cloned().collect();
        relevant.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        relevant.truncate(limit.max(0) as usize);
        Ok(relevant)
    }
}

/// A deterministic `QuestionGenerator` double. Scripted responses are
/// consumed in order; once exhausted it returns `requested_count` synthetic
/// valid candidates, matching `MOCK_GENERATOR=true` in §6/§4a.
pub struct MockGenerator {
    scripted: Mutex<VecDeque<Result<Vec<GeneratedQuestion>, GeneratorError>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self { scripted: Mutex::new(VecDeque::new()) }
    }

    pub fn push_response(&self, response: Result<Vec<GeneratedQuestion>, GeneratorError>) {
        self.scripted.lock().unwrap().push_back(response);
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    async fn generate(&self, ctx: &GenerationContext) -> Result<Vec<GeneratedQuestion>, GeneratorError> {
        if let Some(scripted) = self.scripted.lock().unwrap().pop_front() {
            return scripted;
        }

        Ok((0..ctx.requested_count)
            .map(|i| GeneratedQuestion {
                subject: ctx.subject.clone(),
                topic: ctx.topic.clone(),
                subtopic: ctx.subtopic.clone(),
                grade: Some(ctx.grade),
                difficulty: ctx.difficulty.as_str().to_string(),
                stem: format!("mock generated question {i} for {}", ctx.subtopic),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: "a".into(),
                rationale: Some(String::new()),
                standard_ref: None,
            })
            .collect())
    }
}

/// A settable `Clock` double.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.now.lock().unwrap();
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
