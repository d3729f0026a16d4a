//! Concurrent batch execution
//!
//! `TaskGroup` runs a fixed set of independent fallible operations
//! concurrently and returns a single aggregated report only after every
//! operation has finished. Outcomes travel over an mpsc channel with one
//! sender clone per task; the aggregator drains the channel until all
//! senders are gone, so the collection loop terminates deterministically
//! without a separate watcher task.

use crate::observability::{Metrics, MetricsSnapshot};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, warn};

/// Terminal failure of a single work item. Never retried, never escalated
/// to abort sibling tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("retrieval of {url} failed: {reason}")]
    Retrieval { url: String, reason: String },

    #[error("storage at {path} failed: {reason}")]
    Storage { path: PathBuf, reason: String },

    #[error("scan of {path} failed: {reason}")]
    Scan { path: PathBuf, reason: String },
}

/// Result of processing one work item, produced exactly once per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Operation completed; `detail` is an optional human-readable summary.
    Success { detail: Option<String> },
    Failure(TaskError),
}

impl Outcome {
    pub fn success() -> Self {
        Outcome::Success { detail: None }
    }

    pub fn success_with(detail: impl Into<String>) -> Self {
        Outcome::Success {
            detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// One failed item in a [`BatchReport`]: the item's display label plus the
/// error its operation produced.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub label: String,
    pub error: TaskError,
}

/// Aggregated result of one [`TaskGroup::run`] call.
///
/// Failures appear in completion order, which is nondeterministic; callers
/// must not rely on it matching submission order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub submitted: usize,
    pub succeeded: usize,
    pub failures: Vec<TaskFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Runs one tokio task per work item and aggregates their outcomes.
///
/// The reference behavior is unbounded fan-out ([`TaskGroup::new`]); a
/// semaphore cap ([`TaskGroup::bounded`]) limits in-flight tasks without
/// changing the contract. No cancellation, no per-task timeout, no retry.
pub struct TaskGroup {
    limit: Option<usize>,
    metrics: Arc<Metrics>,
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskGroup {
    /// Unbounded fan-out: every item gets its task immediately.
    pub fn new() -> Self {
        Self {
            limit: None,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Cap in-flight tasks at `cap`. A zero cap would deadlock, so it is
    /// treated as 1.
    pub fn bounded(cap: usize) -> Self {
        Self {
            limit: Some(cap.max(1)),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Counter snapshot across all `run` calls on this group.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Run `process` concurrently over every item and block until all
    /// outcomes have arrived.
    ///
    /// Each item is a `(label, payload)` pair; the label identifies the item
    /// in failure records. `process` must convert every underlying error
    /// into a `Failure` outcome rather than panicking. Outcomes are counted
    /// and collected, never inspected for content.
    ///
    /// Guarantees: exactly one outcome per item, no early return, empty
    /// input returns an empty report without spawning anything.
    pub async fn run<I, F, Fut>(&self, items: Vec<(String, I)>, process: F) -> BatchReport
    where
        I: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Outcome> + Send + 'static,
    {
        let submitted = items.len();
        if submitted == 0 {
            debug!("Empty batch, nothing to spawn");
            return BatchReport::default();
        }

        let process = Arc::new(process);
        let semaphore = self.limit.map(|cap| Arc::new(Semaphore::new(cap)));
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, Outcome)>();

        for (label, item) in items {
            let tx = tx.clone();
            let process = Arc::clone(&process);
            let semaphore = semaphore.clone();
            self.metrics.task_spawned();

            tokio::spawn(async move {
                // The semaphore is never closed, so acquire only fails if
                // the group is torn down mid-run; the task then proceeds
                // unthrottled rather than losing its outcome.
                let _permit = match &semaphore {
                    Some(sem) => sem.acquire().await.ok(),
                    None => None,
                };

                let outcome = process(item).await;
                if tx.send((label, outcome)).is_err() {
                    // Aggregator gone; only possible if run() was dropped.
                    warn!("Outcome receiver dropped before task reported");
                }
            });
        }

        // Dropping the original sender leaves one clone per task; recv()
        // yields None once every task has reported and dropped its clone.
        drop(tx);

        let mut report = BatchReport {
            submitted,
            ..Default::default()
        };

        while let Some((label, outcome)) = rx.recv().await {
            match outcome {
                Outcome::Success { detail } => {
                    report.succeeded += 1;
                    self.metrics.task_succeeded();
                    if let Some(detail) = detail {
                        debug!(%label, %detail, "Task succeeded");
                    }
                }
                Outcome::Failure(error) => {
                    self.metrics.task_failed();
                    debug!(%label, %error, "Task failed");
                    report.failures.push(TaskFailure { label, error });
                }
            }
        }

        debug_assert_eq!(report.succeeded + report.failures.len(), report.submitted);
        report
    }
}
