//! Log line classification by bracketed severity tag
//!
//! Reads a log file line by line and appends each line into the category
//! file of every severity whose bracketed tag it contains. Category handles
//! are opened at the start of one file's processing and released at the end;
//! they are never shared between concurrent tasks (each task holds its own
//! append-mode handles). Each matched line goes out as one write, so
//! concurrent tasks appending to the same category file cannot tear a line.

use crate::group::{Outcome, TaskError};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// The fixed set of recognized severities, in category-file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// The bracketed tag matched against each line, e.g. `"[error]"`.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Info => "[info]",
            Severity::Warning => "[warning]",
            Severity::Error => "[error]",
            Severity::Critical => "[critical]",
        }
    }

    /// Category file this severity's lines are appended to.
    pub fn file_name(self) -> &'static str {
        match self {
            Severity::Info => "info.log",
            Severity::Warning => "warning.log",
            Severity::Error => "error.log",
            Severity::Critical => "critical.log",
        }
    }
}

/// Per-severity append handles for one file's processing.
struct CategorySinks {
    writers: Vec<(Severity, File)>,
}

impl CategorySinks {
    /// Open every category file in append mode (created if absent).
    async fn open(out_dir: &Path) -> Result<Self, TaskError> {
        let mut writers = Vec::with_capacity(Severity::ALL.len());
        for severity in Severity::ALL {
            let path = out_dir.join(severity.file_name());
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .map_err(|e| TaskError::Storage {
                    path,
                    reason: e.to_string(),
                })?;
            writers.push((severity, file));
        }
        Ok(Self { writers })
    }

    /// Append `line` to every category whose tag it contains. Returns how
    /// many categories matched. Line and trailing newline go out as a
    /// single write so concurrent appenders never interleave mid-line.
    async fn route(&mut self, line: &str, out_dir: &Path) -> Result<usize, TaskError> {
        let mut matched = 0;
        for (severity, file) in &mut self.writers {
            if line.contains(severity.tag()) {
                let mut record = Vec::with_capacity(line.len() + 1);
                record.extend_from_slice(line.as_bytes());
                record.push(b'\n');
                file.write_all(&record)
                    .await
                    .map_err(|e| TaskError::Storage {
                        path: out_dir.join(severity.file_name()),
                        reason: e.to_string(),
                    })?;
                matched += 1;
            }
        }
        Ok(matched)
    }

    async fn flush(&mut self, out_dir: &Path) -> Result<(), TaskError> {
        for (severity, file) in &mut self.writers {
            file.flush().await.map_err(|e| TaskError::Storage {
                path: out_dir.join(severity.file_name()),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

/// Classify one log file into the per-severity category files under
/// `out_dir`. A line containing several tags is appended to several
/// category files. File open/write failures map to `Storage`;
/// line-scanning failures map to `Scan`.
pub async fn classify_and_append(source: &Path, out_dir: &Path) -> Outcome {
    match classify_inner(source, out_dir).await {
        Ok(appended) => {
            info!(
                source = %source.display(),
                appended,
                "Classified log file"
            );
            Outcome::success_with(format!(
                "classified {} ({} line appends)",
                source.display(),
                appended
            ))
        }
        Err(err) => Outcome::Failure(err),
    }
}

async fn classify_inner(source: &Path, out_dir: &Path) -> Result<usize, TaskError> {
    let file = File::open(source).await.map_err(|e| TaskError::Storage {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut sinks = CategorySinks::open(out_dir).await?;
    let mut lines = BufReader::new(file).lines();
    let mut appended = 0;

    loop {
        let line = lines.next_line().await.map_err(|e| TaskError::Scan {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
        let Some(line) = line else { break };
        appended += sinks.route(&line, out_dir).await?;
    }

    sinks.flush(out_dir).await?;
    Ok(appended)
}

/// List the `*.log` regular files in `dir`. Listing failure is a `Scan`
/// error; entries that are not plain `.log` files are skipped.
pub async fn scan_log_dir(dir: &Path) -> Result<Vec<PathBuf>, TaskError> {
    let scan_err = |e: std::io::Error| TaskError::Scan {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(scan_err)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(scan_err)? {
        let path = entry.path();
        let is_file = entry.file_type().await.map_err(scan_err)?.is_file();
        if is_file && path.extension().is_some_and(|ext| ext == "log") {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-log entry");
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_tags() {
        assert_eq!(Severity::Info.tag(), "[info]");
        assert_eq!(Severity::Critical.tag(), "[critical]");
        assert_eq!(Severity::Warning.file_name(), "warning.log");
        assert_eq!(Severity::ALL.len(), 4);
    }

    #[tokio::test]
    async fn test_unopenable_source_is_storage_error() {
        let out = tempfile::TempDir::new().unwrap();
        let outcome =
            classify_and_append(Path::new("/definitely/not/here.log"), out.path()).await;
        assert!(matches!(
            outcome,
            Outcome::Failure(TaskError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn test_scan_log_dir_filters_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        tokio::fs::write(dir.path().join("app.log"), "x").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "x").await.unwrap();
        tokio::fs::create_dir(dir.path().join("sub.log")).await.unwrap();

        let files = scan_log_dir(dir.path()).await.unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.log"));
    }

    #[tokio::test]
    async fn test_scan_missing_dir_is_scan_error() {
        let err = scan_log_dir(Path::new("/definitely/not/a/dir"))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Scan { .. }));
    }
}
