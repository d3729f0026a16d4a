use crate::humanize::de_opt_bytes;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub classify: ClassifyConfig,
}

/// Batch runner configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Cap on in-flight tasks per batch. Absent = unbounded fan-out.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

/// Downloader configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_download_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Optional body size cap, e.g. `"50MB"` or a byte count.
    #[serde(default, deserialize_with = "de_opt_bytes")]
    pub max_fetch_bytes: Option<u64>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_download_dir(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            max_fetch_bytes: None,
        }
    }
}

impl DownloadConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Log classifier configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifyConfig {
    #[serde(default = "default_classify_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default = "default_classify_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            source_dir: default_classify_source_dir(),
            output_dir: default_classify_output_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    "BatchBox/0.1.0".to_string()
}

fn default_classify_source_dir() -> PathBuf {
    PathBuf::from("logfiles")
}

fn default_classify_output_dir() -> PathBuf {
    PathBuf::from("filteredlogs")
}
