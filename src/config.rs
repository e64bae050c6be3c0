use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::fetch::RetryPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ArchiveConfig {
    #[serde(default = "default_cdx_api")]
    pub cdx_api: String,
    #[serde(default = "default_wayback_api")]
    pub wayback_api: String,
    /// Hard cap on candidate snapshots per query.
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            cdx_api: default_cdx_api(),
            wayback_api: default_wayback_api(),
            snapshot_limit: default_snapshot_limit(),
        }
    }
}

fn default_cdx_api() -> String {
    "https://web.archive.org/cdx/search/cdx".to_string()
}
fn default_wayback_api() -> String {
    "https://web.archive.org/web".to_string()
}
fn default_snapshot_limit() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_initial_delay_ms() -> u64 {
    2000
}
fn default_backoff_multiplier() -> f64 {
    2.0
}
fn default_timeout_secs() -> u64 {
    30
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load configuration from a TOML file. Every field has a default, so a
/// missing file (when `required` is false) or an empty file is fine.
pub fn load_config(path: &Path, required: bool) -> Result<Config> {
    if !path.exists() && !required {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.retry.max_attempts < 1 {
        anyhow::bail!("retry.max_attempts must be >= 1");
    }
    if config.retry.backoff_multiplier <= 1.0 {
        anyhow::bail!("retry.backoff_multiplier must be > 1.0");
    }
    if config.archive.snapshot_limit < 1 {
        anyhow::bail!("archive.snapshot_limit must be >= 1");
    }

    Ok(config)
}
