//! Integration tests for the batch execution primitive

use batchbox::group::{Outcome, TaskError, TaskGroup};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::Duration;

fn items(n: usize) -> Vec<(String, usize)> {
    (0..n).map(|i| (format!("item-{i}"), i)).collect()
}

/// Deterministic operation: every third item fails.
async fn fail_every_third(n: usize) -> Outcome {
    if n % 3 == 2 {
        Outcome::Failure(TaskError::Storage {
            path: PathBuf::from(format!("/dev/full/{n}")),
            reason: "no space".into(),
        })
    } else {
        Outcome::success()
    }
}

#[tokio::test]
async fn test_completeness_across_batch_sizes() {
    for n in [0usize, 1, 2, 5, 32] {
        let group = TaskGroup::new();
        let report = group.run(items(n), fail_every_third).await;

        assert_eq!(report.submitted, n);
        assert_eq!(
            report.succeeded + report.failed(),
            n,
            "lost an outcome at n={n}"
        );
    }
}

#[tokio::test]
async fn test_aggregation_is_idempotent() {
    let group = TaskGroup::new();
    let first = group.run(items(30), fail_every_third).await;
    let second = group.run(items(30), fail_every_third).await;

    assert_eq!(first.succeeded, second.succeeded);
    assert_eq!(first.failed(), second.failed());
    assert_eq!(first.failed(), 10);
}

#[tokio::test]
async fn test_run_waits_for_delayed_item() {
    let slow_finished = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&slow_finished);

    let group = TaskGroup::new();
    let report = group
        .run(items(5), move |n| {
            let flag = Arc::clone(&flag);
            async move {
                if n == 3 {
                    tokio::time::sleep(Duration::from_millis(250)).await;
                    flag.store(true, Ordering::SeqCst);
                }
                Outcome::success()
            }
        })
        .await;

    assert!(slow_finished.load(Ordering::SeqCst), "run returned early");
    assert_eq!(report.succeeded, 5);
}

#[tokio::test]
async fn test_all_items_fail_returns_normally() {
    let group = TaskGroup::new();
    let report = group
        .run(items(4), |n| async move {
            Outcome::Failure(TaskError::Retrieval {
                url: format!("http://host/{n}"),
                reason: "connection refused".into(),
            })
        })
        .await;

    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed(), 4);
}

#[tokio::test]
async fn test_failure_labels_identify_items() {
    let group = TaskGroup::new();
    let report = group
        .run(items(3), |n| async move {
            if n == 1 {
                Outcome::Failure(TaskError::Scan {
                    path: PathBuf::from("/x"),
                    reason: "denied".into(),
                })
            } else {
                Outcome::success()
            }
        })
        .await;

    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].label, "item-1");
}

#[tokio::test]
async fn test_bounded_group_keeps_the_contract() {
    let group = TaskGroup::bounded(3);
    let report = group.run(items(20), fail_every_third).await;

    assert_eq!(report.submitted, 20);
    assert_eq!(report.succeeded + report.failed(), 20);
}
