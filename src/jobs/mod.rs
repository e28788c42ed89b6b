//! Background jobs
//!
//! A small in-process job runner standing in for an external worker queue.
//! Jobs run as tokio tasks under a deadline; their status is kept in memory
//! and can be polled by id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::ocr::OcrError;

/// Queue used for long-running reads
pub const LONG_QUEUE: &str = "long";

/// Deadline for jobs on the long queue
pub const LONG_TIMEOUT: Duration = Duration::from_secs(1500);

/// How long finished jobs stay queryable
pub const FINISHED_JOB_RETENTION: Duration = Duration::from_secs(3600);

/// Unit of work handed to a [`TaskSubmitter`]
pub type JobFuture = BoxFuture<'static, Result<(), OcrError>>;

// ============================================================================
// Types
// ============================================================================

/// How a job should be scheduled
#[derive(Debug, Clone)]
pub struct EnqueueOptions {
    /// Human readable job name (shown in status)
    pub name: String,
    pub queue: String,
    pub timeout: Duration,
    /// Run in the background; when false the job runs before `submit` returns
    pub is_async: bool,
    /// Run immediately in the caller, regardless of `is_async`
    pub now: bool,
}

impl EnqueueOptions {
    /// Options for the `long` queue with its 1500 s deadline
    pub fn long(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: LONG_QUEUE.to_string(),
            timeout: LONG_TIMEOUT,
            is_async: true,
            now: false,
        }
    }

    pub fn is_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn now(mut self, now: bool) -> Self {
        self.now = now;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn runs_inline(&self) -> bool {
        self.now || !self.is_async
    }
}

/// Job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Started,
    Finished,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::TimedOut)
    }
}

/// Snapshot of a job
#[derive(Debug, Clone, Serialize)]
pub struct JobInfo {
    pub id: String,
    pub name: String,
    pub queue: String,
    pub status: JobStatus,
    pub error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobInfo {
    /// Finished at least `retention` before `now`
    fn is_expired(&self, now: DateTime<Utc>, retention: Duration) -> bool {
        match self.finished_at {
            Some(finished_at) if self.status.is_done() => (now - finished_at)
                .to_std()
                .map(|age| age >= retention)
                .unwrap_or(false),
            _ => false,
        }
    }

    fn queued(options: &EnqueueOptions) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: options.name.clone(),
            queue: options.queue.clone(),
            status: JobStatus::Queued,
            error: None,
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }
}

/// Anything that can schedule a job
#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    /// Schedule `job`. Inline jobs have finished (or failed) when this returns.
    async fn submit(&self, options: EnqueueOptions, job: JobFuture) -> Result<JobInfo, OcrError>;

    /// Current state of a job, if it is known
    async fn status(&self, id: &str) -> Option<JobInfo>;
}

// ============================================================================
// Job Queue
// ============================================================================

/// In-memory job runner on the tokio runtime
///
/// Finished jobs are dropped once they are older than the retention period.
#[derive(Clone)]
pub struct JobQueue {
    jobs: Arc<RwLock<HashMap<String, JobInfo>>>,
    retention: Duration,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self {
            jobs: Arc::default(),
            retention: FINISHED_JOB_RETENTION,
        }
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Forget finished jobs past retention
    async fn prune(&self) {
        let now = Utc::now();
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, info| !info.is_expired(now, self.retention));
        let pruned = before - jobs.len();
        if pruned > 0 {
            debug!(pruned, "Pruned finished jobs");
        }
    }

    async fn run(&self, id: &str, timeout: Duration, job: JobFuture) -> Result<(), OcrError> {
        self.transition(id, JobStatus::Started, None).await;

        match tokio::time::timeout(timeout, job).await {
            Ok(Ok(())) => {
                self.transition(id, JobStatus::Finished, None).await;
                info!(job_id = %id, "Job finished");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(job_id = %id, error = %e, "Job failed");
                self.transition(id, JobStatus::Failed, Some(e.to_string()))
                    .await;
                Err(e)
            }
            Err(_) => {
                warn!(job_id = %id, timeout_secs = timeout.as_secs(), "Job timed out");
                let message = format!("Job timed out after {}s", timeout.as_secs());
                self.transition(id, JobStatus::TimedOut, Some(message.clone()))
                    .await;
                Err(OcrError::Task(message))
            }
        }
    }

    async fn transition(&self, id: &str, status: JobStatus, error: Option<String>) {
        let mut jobs = self.jobs.write().await;
        if let Some(info) = jobs.get_mut(id) {
            info.status = status;
            info.error = error;
            match status {
                JobStatus::Started => info.started_at = Some(Utc::now()),
                s if s.is_done() => info.finished_at = Some(Utc::now()),
                _ => {}
            }
        }
    }
}

#[async_trait]
impl TaskSubmitter for JobQueue {
    async fn submit(&self, options: EnqueueOptions, job: JobFuture) -> Result<JobInfo, OcrError> {
        self.prune().await;

        let info = JobInfo::queued(&options);
        let id = info.id.clone();
        self.jobs.write().await.insert(id.clone(), info.clone());
        info!(job_id = %id, name = %options.name, queue = %options.queue, "Job enqueued");

        if options.runs_inline() {
            self.run(&id, options.timeout, job).await?;
            return Ok(self.status(&id).await.unwrap_or(info));
        }

        let queue = self.clone();
        tokio::spawn(async move {
            // Failures are recorded on the job
            let _ = queue.run(&id, options.timeout, job).await;
        });

        Ok(info)
    }

    async fn status(&self, id: &str) -> Option<JobInfo> {
        self.jobs.read().await.get(id).cloned()
    }
}
