//! Batch entry points for the CLI subcommands
//!
//! Each command builds its work-item list, runs the task group with the
//! matching operation, then prints one line per failure after the run.

use crate::cli::{ClassifyArgs, DownloadArgs};
use batchbox::classify;
use batchbox::config::Config;
use batchbox::fetch::{HttpClient, HttpConfig, file_name_for_url};
use batchbox::group::{BatchReport, TaskGroup};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn task_group(config: &Config) -> TaskGroup {
    match config.runner.max_concurrency {
        Some(cap) => TaskGroup::bounded(cap),
        None => TaskGroup::new(),
    }
}

fn report_failures(report: &BatchReport, verb: &str) {
    for failure in &report.failures {
        eprintln!("Error {} {}: {}", verb, failure.label, failure.error);
    }
    info!(
        submitted = report.submitted,
        succeeded = report.succeeded,
        failed = report.failed(),
        "Batch finished"
    );
}

pub async fn download(config: Config, args: DownloadArgs) -> Result<BatchReport, AnyError> {
    let mut urls = args.urls;
    if let Some(list) = &args.list {
        let content = tokio::fs::read_to_string(list).await?;
        urls.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    let out_dir = args.out_dir.unwrap_or_else(|| config.download.output_dir.clone());
    tokio::fs::create_dir_all(&out_dir).await?;

    let client = Arc::new(HttpClient::new(HttpConfig {
        connect_timeout: config.download.connect_timeout(),
        request_timeout: config.download.request_timeout(),
        user_agent: config.download.user_agent.clone(),
        max_fetch_bytes: config.download.max_fetch_bytes,
    })?);

    let items: Vec<(String, (String, PathBuf))> = urls
        .into_iter()
        .map(|url| {
            let dest = out_dir.join(file_name_for_url(&url));
            (url.clone(), (url, dest))
        })
        .collect();

    info!(count = items.len(), out_dir = %out_dir.display(), "Starting download batch");

    let group = task_group(&config);
    let report = group
        .run(items, move |(url, dest)| {
            let client = Arc::clone(&client);
            async move { client.fetch_and_store(&url, &dest).await }
        })
        .await;

    report_failures(&report, "downloading");
    Ok(report)
}

pub async fn classify(config: Config, args: ClassifyArgs) -> Result<BatchReport, AnyError> {
    let source_dir = args
        .source_dir
        .unwrap_or_else(|| config.classify.source_dir.clone());
    let out_dir = args
        .out_dir
        .unwrap_or_else(|| config.classify.output_dir.clone());
    tokio::fs::create_dir_all(&out_dir).await?;

    let files = classify::scan_log_dir(&source_dir).await?;
    let items: Vec<(String, PathBuf)> = files
        .into_iter()
        .map(|path| (path.display().to_string(), path))
        .collect();

    info!(
        count = items.len(),
        source_dir = %source_dir.display(),
        out_dir = %out_dir.display(),
        "Starting classify batch"
    );

    let group = task_group(&config);
    let out_dir = Arc::new(out_dir);
    let report = group
        .run(items, move |path| {
            let out_dir = Arc::clone(&out_dir);
            async move { classify::classify_and_append(&path, &out_dir).await }
        })
        .await;

    report_failures(&report, "classifying");
    Ok(report)
}
