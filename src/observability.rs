//! Observability stubs (metrics, tracing)

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for batch execution, incremented by the task group
#[derive(Debug, Default)]
pub struct Metrics {
    tasks_spawned: AtomicU64,
    tasks_succeeded: AtomicU64,
    tasks_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_spawned(&self) {
        self.tasks_spawned.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "tasks_spawned", "Metric incremented");
    }

    pub fn task_succeeded(&self) {
        self.tasks_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "tasks_succeeded", "Metric incremented");
    }

    pub fn task_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "tasks_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
            tasks_succeeded: self.tasks_succeeded.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub tasks_spawned: u64,
    pub tasks_succeeded: u64,
    pub tasks_failed: u64,
}
