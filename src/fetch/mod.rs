//! HTTP fetch-and-store operation
//!
//! Retrieves a remote resource and writes its full byte content to a local
//! destination. One invocation per work item; every underlying failure is
//! converted into a `Failure` outcome so nothing escapes the task.

use crate::group::{Outcome, TaskError};
use crate::humanize::format_bytes;
use bytes::Bytes;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Refuse bodies larger than this many bytes. `None` = no cap.
    pub max_fetch_bytes: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: "BatchBox/0.1.0".to_string(),
            max_fetch_bytes: None,
        }
    }
}

/// HTTP downloader. No retry or backoff; a failed fetch is terminal for
/// its work item.
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self, TaskError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TaskError::Retrieval {
                url: String::new(),
                reason: format!("client construction failed: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// Fetch `url` and write the whole body to `dest`, creating or
    /// truncating it. Network and status failures map to `Retrieval`,
    /// local write failures to `Storage`.
    pub async fn fetch_and_store(&self, url: &str, dest: &Path) -> Outcome {
        let bytes = match self.fetch(url).await {
            Ok(bytes) => bytes,
            Err(err) => return Outcome::Failure(err),
        };

        let size = bytes.len() as u64;
        if let Err(e) = tokio::fs::write(dest, &bytes).await {
            return Outcome::Failure(TaskError::Storage {
                path: dest.to_path_buf(),
                reason: e.to_string(),
            });
        }

        info!(
            url,
            dest = %dest.display(),
            size = %format_bytes(size),
            "Downloaded"
        );
        Outcome::success_with(format!(
            "downloaded {} to {} ({})",
            url,
            dest.display(),
            format_bytes(size)
        ))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, TaskError> {
        debug!(url, "Starting download");

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| TaskError::Retrieval {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Retrieval {
                url: url.to_string(),
                reason: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let bytes = response.bytes().await.map_err(|e| TaskError::Retrieval {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;

        if let Some(cap) = self.config.max_fetch_bytes {
            if bytes.len() as u64 > cap {
                return Err(TaskError::Retrieval {
                    url: url.to_string(),
                    reason: format!(
                        "body of {} exceeds cap of {}",
                        format_bytes(bytes.len() as u64),
                        format_bytes(cap)
                    ),
                });
            }
        }

        debug!(url, size = bytes.len(), "Download completed");
        Ok(bytes)
    }
}

/// Derive a destination file name from a URL: last non-empty path segment
/// with any query string stripped, falling back to `"download"`.
pub fn file_name_for_url(url: &str) -> String {
    let without_query = url.split_once('?').map_or(url, |(before, _)| before);
    let rest = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);

    // Nothing past the host, e.g. "https://example.com/", gets the fallback.
    match rest.trim_end_matches('/').split_once('/') {
        Some((_, path)) => match path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "download".to_string(),
        },
        None => "download".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "BatchBox/0.1.0");
        assert_eq!(config.max_fetch_bytes, None);
    }

    #[test]
    fn test_file_name_from_path() {
        assert_eq!(
            file_name_for_url("https://example.com/files/report.txt"),
            "report.txt"
        );
        assert_eq!(file_name_for_url("https://example.com/a/b/"), "b");
    }

    #[test]
    fn test_file_name_strips_query() {
        assert_eq!(
            file_name_for_url("https://example.com/file.bin?token=abc"),
            "file.bin"
        );
    }

    #[test]
    fn test_file_name_fallback() {
        assert_eq!(file_name_for_url("https://example.com/"), "download");
        assert_eq!(file_name_for_url("https://example.com"), "download");
    }
}
