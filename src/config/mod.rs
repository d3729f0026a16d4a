//! Configuration management for BatchBox
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `BATCHBOX__<section>__<key>`
//!
//! Examples:
//! - `BATCHBOX__DOWNLOAD__OUTPUT_DIR=/tmp/fetched`
//! - `BATCHBOX__RUNNER__MAX_CONCURRENCY=16`
//! - `BATCHBOX__DOWNLOAD__MAX_FETCH_BYTES=50MB`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/batchbox.toml`.
//! This can be overridden using the `BATCHBOX_CONFIG` environment variable.

mod models;
mod sources;

pub use models::{ClassifyConfig, Config, DownloadConfig, RunnerConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`BATCHBOX__*`)
    /// 2. TOML file (default: `config/batchbox.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.runner.max_concurrency == Some(0) {
        return Err(ValidationError::ZeroValue {
            field: "runner.max_concurrency",
        });
    }
    if config.download.connect_timeout_secs == 0 {
        return Err(ValidationError::ZeroValue {
            field: "download.connect_timeout_secs",
        });
    }
    if config.download.request_timeout_secs == 0 {
        return Err(ValidationError::ZeroValue {
            field: "download.request_timeout_secs",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[download]
output_dir = "out"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.download.output_dir.to_str(), Some("out"));
        // Untouched sections keep their defaults
        assert_eq!(config.classify.output_dir.to_str(), Some("filteredlogs"));
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.download.connect_timeout_secs, 10);
        assert_eq!(config.download.user_agent, "BatchBox/0.1.0");
        assert_eq!(config.classify.source_dir.to_str(), Some("logfiles"));
    }

    #[test]
    fn test_validation_catches_zero_concurrency() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[runner]
max_concurrency = 0
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::ZeroValue {
                field: "runner.max_concurrency"
            })
        ));
    }

    #[test]
    fn test_validation_catches_zero_timeout() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[download]\nrequest_timeout_secs = 0\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(result.is_err());
    }
}
