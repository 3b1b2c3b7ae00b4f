//! Wire DTOs for the HTTP surface (§6a). Internal `Question`/`Session`/etc.
//! never cross the boundary directly — these types apply the C3 "title case"
//! presentation transform and omit fields (e.g. `correct_answer` on fetch)
//! that the core does not disclose at that point in the flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::Difficulty;

fn default_fetch_limit() -> u32 {
    10
}

/// `POST /v1/questions/fetch` request body.
#[derive(Debug, Deserialize, Validate)]
pub struct FetchQuestionsRequest {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(range(min = 0, max = 12))]
    pub grade: i16,
    #[validate(length(min = 1, max = 100))]
    pub topic: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub subtopic: Option<String>,
    #[validate(range(min = 1, max = 50))]
    #[serde(default = "default_fetch_limit")]
    pub limit: u32,
}

/// A question as handed to the caller: body case preserved, metadata
/// title-cased, answer key withheld until `submit_attempt` grades it.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDto {
    pub id: Uuid,
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub grade: i16,
    pub difficulty: Difficulty,
    pub stem: String,
    pub options: Vec<String>,
    pub rationale: String,
    pub standard_ref: Option<String>,
}

/// `POST /v1/questions/fetch` response body.
#[derive(Debug, Serialize)]
pub struct FetchQuestionsResponse {
    pub questions: Vec<QuestionDto>,
    pub resolved_subject: String,
    pub resolved_topic: String,
    pub resolved_subtopic: Option<String>,
    pub session_id: Uuid,
    /// Per §4.7 step 6: the per-subtopic stock deficit observed at fetch
    /// time, after a generation job (if any) was submitted for it.
    pub deficit: u32,
}

/// `POST /v1/attempts` request body.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    pub question_id: Uuid,
    #[validate(length(min = 1, max = 2000))]
    pub selected: String,
    #[validate(range(min = 0))]
    pub elapsed_ms: i64,
}

/// `POST /v1/attempts` response body.
#[derive(Debug, Serialize)]
pub struct SubmitAttemptResponse {
    pub attempt_id: Uuid,
    pub correct: bool,
    /// The correct answer is always disclosed once grading has happened (§4.9).
    pub correct_answer: String,
    pub session_id: Uuid,
}

/// Per-subject slice of `GET /v1/learners/{id}/progress`.
#[derive(Debug, Serialize)]
pub struct SubjectProgress {
    pub attempted: u64,
    pub correct: u64,
    pub accuracy_pct: u32,
}

/// `GET /v1/learners/{id}/progress` response body.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub attempted: u64,
    pub correct: u64,
    pub accuracy_pct: u32,
    pub current_streak: u32,
    pub by_subject: std::collections::BTreeMap<String, SubjectProgress>,
}

/// Session as presented to callers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDto {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// `GET /v1/sessions/{id}/summary` response body.
#[derive(Debug, Serialize)]
pub struct SessionSummaryResponse {
    pub session: SessionDto,
    pub questions_attempted: u64,
    pub questions_correct: u64,
    pub accuracy_pct: u32,
    pub total_elapsed_ms: i64,
    pub avg_elapsed_ms: i64,
    pub subjects_practiced: Vec<String>,
}

/// `GET /v1/subtopics` query parameters.
#[derive(Debug, Deserialize, Validate)]
pub struct ListSubtopicsQuery {
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(range(min = 0, max = 12))]
    pub grade: i16,
    #[validate(length(min = 1, max = 100))]
    pub topic: Option<String>,
}

/// One entry in `GET /v1/subtopics`, title-cased for display (§4.3).
#[derive(Debug, Serialize)]
pub struct SubtopicDto {
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub sequence_order: i32,
    pub description: Option<String>,
}
