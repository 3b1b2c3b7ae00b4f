//! Single-flight dispatcher for generation jobs (C8, §4.8). The heaviest
//! component in the system.
//!
//! The job table lives in a single `kameo` actor mailbox — the same
//! single-writer pattern the teacher uses for `PackCacheActor` — so
//! single-flight bookkeeping needs no explicit locking. The actor dispatches
//! accepted jobs onto a bounded channel drained by `GEN_WORKERS` tokio
//! tasks; workers report completion/failure back to the actor by message,
//! so every state transition happens inside the mailbox.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use kameo::Actor;
use kameo::actor::ActorRef;
use kameo::message::{Context, Message};
use rand::Rng;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use iqrah_backend_domain::{
    Difficulty, GenerationContext, GenerationJobStatus, GeneratedQuestion, GeneratorError, JobKey,
    JobState, Question,
};

use crate::fingerprint::{contains_reserved_separator, fingerprint};
use crate::normalize::normalize_metadata;
use crate::ports::{InventoryStore, QuestionGenerator};
use crate::validate::{validate, Candidate};

/// Tunables for the coordinator, sourced from `AppConfig` (§3a).
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub workers: usize,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_jitter_fraction: f64,
    pub deadline_ms: u64,
    pub queue_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_attempts: 5,
            backoff_base_ms: 500,
            backoff_jitter_fraction: 0.2,
            deadline_ms: 30_000,
            queue_capacity: 256,
        }
    }
}

/// A single unit of work handed to a worker.
struct WorkItem {
    key: JobKey,
    requested_count: u32,
}

/// `submit(key, requested_count)` (§4.8).
pub struct Submit {
    pub key: JobKey,
    pub requested_count: u32,
}

/// Read the current status of a job, or `None` if no job (terminal or not)
/// has ever existed for that key.
pub struct Status {
    pub key: JobKey,
}

struct MarkRunning {
    key: JobKey,
}

struct Completed {
    key: JobKey,
    accepted: u64,
    skipped: u64,
}

struct Failed {
    key: JobKey,
    reason: String,
    retryable: bool,
}

struct Requeue {
    key: JobKey,
}

/// Owns the in-memory `GenerationJob` table (§3, §4.8) and the channel
/// feeding the worker pool.
#[derive(Actor)]
pub struct GenerationCoordinatorActor {
    jobs: HashMap<JobKey, GenerationJobStatus>,
    dispatch: mpsc::Sender<WorkItem>,
    config: CoordinatorConfig,
}

impl GenerationCoordinatorActor {
    fn new(dispatch: mpsc::Sender<WorkItem>, config: CoordinatorConfig) -> Self {
        Self { jobs: HashMap::new(), dispatch, config }
    }

    fn backoff_delay(&self, attempts: u32) -> Duration {
        let base = self.config.backoff_base_ms as f64 * 2f64.powi(attempts as i32 - 1);
        let jitter_span = base * self.config.backoff_jitter_fraction;
        let jitter = rand::thread_rng().gen_range(-jitter_span..=jitter_span);
        Duration::from_millis((base + jitter).max(0.0) as u64)
    }
}

impl Message<Submit> for GenerationCoordinatorActor {
    type Reply = ();

    async fn handle(&mut self, msg: Submit, ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        if let Some(existing) = self.jobs.get_mut(&msg.key) {
            if !existing.state.is_terminal() {
                existing.requested_count = existing.requested_count.max(msg.requested_count);
                debug!(?existing.key, requested_count = existing.requested_count, "coalesced generation request");
                return;
            }
        }

        let job = GenerationJobStatus::new(msg.key.clone(), msg.requested_count);
        self.jobs.insert(msg.key.clone(), job);

        let item = WorkItem { key: msg.key.clone(), requested_count: msg.requested_count };
        // Bounded wait (§4.8 backpressure): never stall the caller indefinitely.
        match self.dispatch.send_timeout(item, Duration::from_millis(50)).await {
            Ok(()) => {}
            Err(_) => {
                warn!(?msg.key, "dispatch queue saturated; retrying shortly");
                let dispatch = self.dispatch.clone();
                let key = msg.key.clone();
                let requested_count = msg.requested_count;
                let actor_ref = ctx.actor_ref();
                tokio::spawn(async move {
                    if dispatch
                        .send_timeout(WorkItem { key: key.clone(), requested_count }, Duration::from_secs(5))
                        .await
                        .is_err()
                    {
                        let _ = actor_ref
                            .tell(Failed { key, reason: "dispatch queue saturated".into(), retryable: true })
                            .send()
                            .await;
                    }
                });
            }
        }
    }
}

impl Message<Status> for GenerationCoordinatorActor {
    type Reply = Option<GenerationJobStatus>;

    async fn handle(&mut self, msg: Status, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        self.jobs.get(&msg.key).cloned()
    }
}

impl Message<MarkRunning> for GenerationCoordinatorActor {
    type Reply = bool;

    async fn handle(&mut self, msg: MarkRunning, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        match self.jobs.get_mut(&msg.key) {
            Some(job) if job.state == JobState::Pending => {
                job.state = JobState::Running;
                job.attempts += 1;
                true
            }
            _ => false,
        }
    }
}

impl Message<Completed> for GenerationCoordinatorActor {
    type Reply = ();

    async fn handle(&mut self, msg: Completed, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        if let Some(job) = self.jobs.get_mut(&msg.key) {
            job.state = JobState::Done;
            job.accepted = msg.accepted;
            job.skipped = msg.skipped;
            info!(?msg.key, accepted = msg.accepted, skipped = msg.skipped, "generation job done");
        }
    }
}

impl Message<Failed> for GenerationCoordinatorActor {
    type Reply = ();

    async fn handle(&mut self, msg: Failed, ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let Some(job) = self.jobs.get_mut(&msg.key) else { return };
        job.last_error = Some(msg.reason.clone());

        if !msg.retryable || job.attempts >= self.config.max_attempts {
            job.state = JobState::Failed;
            warn!(?msg.key, reason = %msg.reason, attempts = job.attempts, "generation job failed permanently");
            return;
        }

        let delay = self.backoff_delay(job.attempts);
        job.state = JobState::Pending;
        let actor_ref = ctx.actor_ref();
        let key = msg.key.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = actor_ref.tell(Requeue { key }).send().await;
        });
    }
}

impl Message<Requeue> for GenerationCoordinatorActor {
    type Reply = ();

    async fn handle(&mut self, msg: Requeue, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let Some(job) = self.jobs.get(&msg.key) else { return };
        if job.state != JobState::Pending {
            return;
        }
        let item = WorkItem { key: msg.key.clone(), requested_count: job.requested_count };
        if self.dispatch.send_timeout(item, Duration::from_millis(50)).await.is_err() {
            warn!(?msg.key, "failed to requeue generation job after backoff");
        }
    }
}

/// Turn one Generator candidate into an admissible `Question`, or drop it
/// with a logged reason (§4.8 step 3–4: normalize, validate, fingerprint).
fn prepare_candidate(raw: GeneratedQuestion, fallback_grade: i16) -> Option<Question> {
    let subject = normalize_metadata(&raw.subject);
    let topic = normalize_metadata(&raw.topic);
    let subtopic = normalize_metadata(&raw.subtopic);
    let grade = raw.grade.unwrap_or(fallback_grade);
    let rationale = raw.rationale.unwrap_or_default();

    let candidate = Candidate {
        subject: subject.clone(),
        topic: topic.clone(),
        subtopic: subtopic.clone(),
        grade: Some(grade),
        difficulty: raw.difficulty.clone(),
        stem: raw.stem.clone(),
        options: raw.options.clone(),
        correct_answer: raw.correct_answer.clone(),
        rationale: Some(rationale.clone()),
        standard_ref: raw.standard_ref.clone(),
    };

    let difficulty = match validate(&candidate) {
        Ok(d) => d,
        Err(kind) => {
            debug!(?kind, "discarding invalid generated candidate");
            return None;
        }
    };

    if contains_reserved_separator(&raw.stem, &raw.options, &raw.correct_answer) {
        return None;
    }

    let fp = fingerprint(&raw.stem, &raw.options, &raw.correct_answer);

    Some(Question {
        id: uuid::Uuid::new_v4(),
        subject,
        topic,
        subtopic,
        grade,
        difficulty,
        stem: raw.stem,
        options: raw.options,
        correct_answer: raw.correct_answer,
        rationale,
        standard_ref: raw.standard_ref,
        fingerprint: fp,
        created_at: chrono::Utc::now(),
    })
}

async fn run_worker(
    receiver: Arc<AsyncMutex<mpsc::Receiver<WorkItem>>>,
    actor_ref: ActorRef<GenerationCoordinatorActor>,
    store: Arc<dyn InventoryStore>,
    generator: Arc<dyn QuestionGenerator>,
    config: CoordinatorConfig,
    cancellation: CancellationToken,
) {
    loop {
        let item = {
            let mut guard = receiver.lock().await;
            tokio::select! {
                _ = cancellation.cancelled() => return,
                item = guard.recv() => item,
            }
        };
        let Some(item) = item else { return };

        let proceed = actor_ref
            .ask(MarkRunning { key: item.key.clone() })
            .send()
            .await
            .unwrap_or(false);
        if !proceed {
            continue;
        }

        let preferred_difficulty = item.key.difficulty;
        let ctx = GenerationContext {
            subject: item.key.subject.clone(),
            topic: item.key.topic.clone(),
            subtopic: item.key.subtopic.clone(),
            grade: item.key.grade,
            difficulty: preferred_difficulty,
            requested_count: item.requested_count,
        };

        let call = generator.generate(&ctx);
        let outcome = tokio::select! {
            _ = cancellation.cancelled() => return,
            result = tokio::time::timeout(Duration::from_millis(config.deadline_ms), call) => result,
        };

        let candidates = match outcome {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(GeneratorError::Permanent(reason))) => {
                let _ = actor_ref.tell(Failed { key: item.key.clone(), reason, retryable: false }).send().await;
                continue;
            }
            Ok(Err(err)) => {
                let _ = actor_ref.tell(Failed { key: item.key.clone(), reason: err.to_string(), retryable: true }).send().await;
                continue;
            }
            Err(_) => {
                let _ = actor_ref
                    .tell(Failed { key: item.key.clone(), reason: "generator call exceeded its deadline".into(), retryable: true })
                    .send()
                    .await;
                continue;
            }
        };

        let mut seen_fingerprints = HashSet::new();
        let mut batch = Vec::new();
        for raw in candidates {
            if let Some(question) = prepare_candidate(raw, item.key.grade) {
                if seen_fingerprints.insert(question.fingerprint.clone()) {
                    batch.push(question);
                }
            }
        }

        if batch.is_empty() {
            let _ = actor_ref
                .tell(Failed { key: item.key.clone(), reason: "generator returned no admissible candidates".into(), retryable: true })
                .send()
                .await;
            continue;
        }

        match store.admit_questions(&batch).await {
            Ok(outcome) => {
                let _ = actor_ref
                    .tell(Completed { key: item.key.clone(), accepted: outcome.accepted, skipped: outcome.skipped })
                    .send()
                    .await;
            }
            Err(err) => {
                let _ = actor_ref.tell(Failed { key: item.key.clone(), reason: err.to_string(), retryable: true }).send().await;
            }
        }
    }
}

/// A handle the rest of the engine uses to talk to the coordinator —
/// `submit` is non-blocking from the caller's perspective.
#[derive(Clone)]
pub struct CoordinatorHandle {
    actor_ref: ActorRef<GenerationCoordinatorActor>,
}

impl CoordinatorHandle {
    pub async fn submit(&self, key: JobKey, requested_count: u32) {
        if let Err(err) = self.actor_ref.tell(Submit { key, requested_count }).send().await {
            warn!(%err, "generation coordinator mailbox unavailable; deficit will be re-observed on next fetch");
        }
    }

    pub async fn status(&self, key: JobKey) -> Option<GenerationJobStatus> {
        self.actor_ref.ask(Status { key }).send().await.ok().flatten()
    }
}

/// Spawn the coordinator actor plus its worker pool. Workers stop promptly
/// when `cancellation` fires (§4.8 cancellation/shutdown).
pub fn spawn_coordinator(
    store: Arc<dyn InventoryStore>,
    generator: Arc<dyn QuestionGenerator>,
    config: CoordinatorConfig,
    cancellation: CancellationToken,
) -> CoordinatorHandle {
    let (sender, receiver) = mpsc::channel(config.queue_capacity);
    let actor_ref = kameo::spawn(GenerationCoordinatorActor::new(sender, config.clone()));

    let receiver = Arc::new(AsyncMutex::new(receiver));
    for _ in 0..config.workers {
        tokio::spawn(run_worker(
            receiver.clone(),
            actor_ref.clone(),
            store.clone(),
            generator.clone(),
            config.clone(),
            cancellation.clone(),
        ));
    }

    CoordinatorHandle { actor_ref }
}
