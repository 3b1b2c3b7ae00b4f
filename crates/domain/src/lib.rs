//! Domain types for the Iqrah adaptive practice engine.

pub mod auth;
pub mod dto;
pub mod errors;
pub mod generation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub use auth::*;
pub use dto::*;
pub use errors::*;
pub use generation::*;

/// Difficulty tier of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(()),
        }
    }
}

/// An admitted, immutable question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub subject: String,
    pub topic: String,
    pub subtopic: String,
    pub grade: i16,
    pub difficulty: Difficulty,
    pub stem: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub rationale: String,
    pub standard_ref: Option<String>,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only catalog entry describing one subtopic within a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtopicCatalogEntry {
    pub subject: String,
    pub grade: i16,
    pub topic: String,
    pub subtopic: String,
    pub sequence_order: i32,
    pub description: Option<String>,
}

/// `(learner_id, fingerprint)` pair marking a question a learner has already
/// answered correctly at least once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenRecord {
    pub learner_id: Uuid,
    pub fingerprint: String,
    pub first_seen_at: DateTime<Utc>,
}

/// A single graded answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub question_id: Uuid,
    pub subject: String,
    pub selected: String,
    pub correct: bool,
    pub elapsed_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// A practice session binding a run of attempts for one learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Context recorded when a session is opened.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub subtopic: Option<String>,
}

/// Counts returned from a bulk admission call.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AdmitOutcome {
    pub accepted: u64,
    pub skipped: u64,
}

/// Compact cross-subject accuracy summary used by the Difficulty Policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccuracySummary {
    pub total_attempts: u64,
    pub total_correct: u64,
}

impl AccuracySummary {
    pub fn accuracy(&self) -> Option<f64> {
        if self.total_attempts == 0 {
            None
        } else {
            Some(self.total_correct as f64 / self.total_attempts as f64)
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub build_sha: String,
    pub uptime_seconds: u64,
}

/// Ready check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub database: String,
}
