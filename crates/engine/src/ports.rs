//! Collaborator traits the engine depends on at construction (§9 design note:
//! "ad-hoc global singletons become explicit dependencies"). Each is a thin
//! `Arc<dyn Trait>` seam, in the style of the teacher's
//! `SessionService { content_repo: Arc<dyn ContentRepository>, .. }`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use iqrah_backend_domain::{
    AccuracySummary, AdmitOutcome, Attempt, Difficulty, EngineError, GenerationContext,
    GeneratedQuestion, GeneratorError, Question, Session, SessionContext, SubtopicCatalogEntry,
};

/// C4's contract as seen by the engine — everything durable goes through
/// this trait (§4.4).
#[async_trait]
pub trait InventoryStore: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn list_questions(
        &self,
        subject: &str,
        grade: i16,
        topic: &str,
        subtopic: &str,
        difficulties: &[Difficulty],
        exclude_fingerprints: &HashSet<String>,
        limit: u32,
    ) -> Result<Vec<Question>, EngineError>;

    async fn count_questions(&self, subject: &str, grade: i16, topic: &str, subtopic: &str) -> Result<i64, EngineError>;

    async fn count_seen_in_subtopic(
        &self,
        learner_id: Uuid,
        subject: &str,
        grade: i16,
        topic: &str,
        subtopic: &str,
    ) -> Result<i64, EngineError>;

    async fn list_subtopics(&self, subject: &str, grade: i16, topic: Option<&str>) -> Result<Vec<SubtopicCatalogEntry>, EngineError>;

    async fn admit_questions(&self, batch: &[Question]) -> Result<AdmitOutcome, EngineError>;

    async fn get_learner_seen(&self, learner_id: Uuid) -> Result<HashSet<String>, EngineError>;

    async fn get_question(&self, question_id: Uuid) -> Result<Option<Question>, EngineError>;

    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<Attempt, EngineError>;

    async fn open_session(&self, learner_id: Uuid, context: &SessionContext) -> Result<Session, EngineError>;

    async fn end_session(&self, session_id: Uuid) -> Result<Option<Session>, EngineError>;

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, EngineError>;

    async fn session_attempts(&self, session_id: Uuid) -> Result<Vec<Attempt>, EngineError>;

    async fn accuracy_summary(&self, learner_id: Uuid) -> Result<AccuracySummary, EngineError>;

    async fn subject_progress(&self, learner_id: Uuid) -> Result<Vec<(String, u64, u64)>, EngineError>;

    async fn recent_attempts(&self, learner_id: Uuid, limit: i64) -> Result<Vec<Attempt>, EngineError>;
}

#[async_trait]
impl InventoryStore for iqrah_backend_storage::InventoryRepository {
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
        Ok(self
            .list_questions(subject, grade, topic, subtopic, difficulties, exclude_fingerprints, limit)
            .await?)
    }

    async fn count_questions(&self, subject: &str, grade: i16, topic: &str, subtopic: &str) -> Result<i64, EngineError> {
        Ok(self.count_questions(subject, grade, topic, subtopic).await?)
    }

    async fn count_seen_in_subtopic(
        &self,
        learner_id: Uuid,
        subject: &str,
        grade: i16,
        topic: &str,
        subtopic: &str,
    ) -> Result<i64, EngineError> {
        Ok(self.count_seen_in_subtopic(learner_id, subject, grade, topic, subtopic).await?)
    }

    async fn list_subtopics(&self, subject: &str, grade: i16, topic: Option<&str>) -> Result<Vec<SubtopicCatalogEntry>, EngineError> {
        Ok(self.list_subtopics(subject, grade, topic).await?)
    }

    async fn admit_questions(&self, batch: &[Question]) -> Result<AdmitOutcome, EngineError> {
        Ok(self.admit_questions(batch).await?)
    }

    async fn get_learner_seen(&self, learner_id: Uuid) -> Result<HashSet<String>, EngineError> {
        Ok(self.get_learner_seen(learner_id).await?)
    }

    async fn get_question(&self, question_id: Uuid) -> Result<Option<Question>, EngineError> {
        Ok(self.get_question(question_id).await?)
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
        Ok(self
            .record_attempt(learner_id, question_id, fingerprint, subject, selected, correct, elapsed_ms, mark_seen_if_correct)
            .await?)
    }

    async fn open_session(&self, learner_id: Uuid, context: &SessionContext) -> Result<Session, EngineError> {
        Ok(self.open_session(learner_id, context).await?)
    }

    async fn end_session(&self, session_id: Uuid) -> Result<Option<Session>, EngineError> {
        Ok(self.end_session(session_id).await?)
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, EngineError> {
        Ok(self.get_session(session_id).await?)
    }

    async fn session_attempts(&self, session_id: Uuid) -> Result<Vec<Attempt>, EngineError> {
        Ok(self.session_attempts(session_id).await?)
    }

    async fn accuracy_summary(&self, learner_id: Uuid) -> Result<AccuracySummary, EngineError> {
        Ok(self.accuracy_summary(learner_id).await?)
    }

    async fn subject_progress(&self, learner_id: Uuid) -> Result<Vec<(String, u64, u64)>, EngineError> {
        Ok(self.subject_progress(learner_id).await?)
    }

    async fn recent_attempts(&self, learner_id: Uuid, limit: i64) -> Result<Vec<Attempt>, EngineError> {
        Ok(self.recent_attempts(learner_id, limit).await?)
    }
}

/// §6's curriculum catalog collaborator: ordered topics per `(subject, grade)`
/// and the default topic when a caller doesn't pin one. Concrete curriculum
/// data is out of scope for the core; this is the seam an external catalog
/// service would implement.
#[async_trait]
pub trait CurriculumCatalog: Send + Sync {
    async fn topics(&self, subject: &str, grade: i16) -> Result<Vec<String>, EngineError>;
    async fn first_topic(&self, subject: &str, grade: i16) -> Result<Option<String>, EngineError> {
        Ok(self.topics(subject, grade).await?.into_iter().next())
    }
}

/// §6's external question generator. Failures distinguish transient from
/// permanent per the coordinator's retry policy (§4.8, §7).
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, ctx: &GenerationContext) -> Result<Vec<GeneratedQuestion>, GeneratorError>;
}

/// Injected time source, per §9's "explicit dependencies" redesign cue —
/// keeps session/backoff timing deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed-table `CurriculumCatalog`, usable until a real catalog service is
/// wired in. `(subject, grade)` keys a caller-ordered topic list; the first
/// entry is the default topic.
#[derive(Debug, Default, Clone)]
pub struct StaticCurriculumCatalog {
    topics: std::collections::HashMap<(String, i16), Vec<String>>,
}

impl StaticCurriculumCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topics(mut self, subject: impl Into<String>, grade: i16, topics: Vec<String>) -> Self {
        self.topics.insert((subject.into(), grade), topics);
        self
    }
}

#[async_trait]
impl CurriculumCatalog for StaticCurriculumCatalog {
    async fn topics(&self, subject: &str, grade: i16) -> Result<Vec<String>, EngineError> {
        Ok(self
            .topics
            .get(&(subject.to_string(), grade))
            .cloned()
            .unwrap_or_default())
    }
}
