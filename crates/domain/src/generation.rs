//! Types exchanged with the external Question Generator (§6) and the
//! Generation Coordinator's internal job bookkeeping (§3 GenerationJob, §4.8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Difficulty;

/// Identifies a single-flight generation job: the scope + difficulty a
/// deficit was observed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub difficulty: Difficulty,
    pub grade: i16,
}

/// Generation job lifecycle state (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

/// In-memory bookkeeping record for one generation job.
#[derive(Debug, Clone)]
pub struct GenerationJobStatus {
    pub key: JobKey,
    pub requested_count: u32,
    pub state: JobState,
    pub attempts: u32,
    pub accepted: u64,
    pub skipped: u64,
    pub last_error: Option<String>,
    pub next_earliest_run_at: Option<DateTime<Utc>>,
}

impl GenerationJobStatus {
    pub fn new(key: JobKey, requested_count: u32) -> Self {
        Self {
            key,
            requested_count,
            state: JobState::Pending,
            attempts: 0,
            accepted: 0,
            skipped: 0,
            last_error: None,
            next_earliest_run_at: None,
        }
    }
}

/// Context handed to the external Generator for one job attempt.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationContext {
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub grade: i16,
    pub difficulty: Difficulty,
    pub requested_count: u32,
}

/// One candidate question as returned by the Generator, before C3/C2/C1.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub grade: Option<i16>,
    pub difficulty: String,
    pub stem: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub rationale: Option<String>,
    pub standard_ref: Option<String>,
}

/// Errors the Generator collaborator may raise (§7).
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("generator transient failure: {0}")]
    Transient(String),
    #[error("generator permanent failure: {0}")]
    Permanent(String),
    #[error("generator call exceeded its deadline")]
    DeadlineExceeded,
}
