// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.stock/config.toml` and includes:
//! - `api_url`: Base URL of the product REST API
//! - Timeouts for API calls and connectivity probing
//! - `[retry]`: How often queued operations are retried

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{parse_base_url, RetryPolicy};

const WORK_DIR_NAME: &str = ".stock";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "inventory.db";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// API the product endpoints are served from unless configured otherwise.
pub const DEFAULT_API_URL: &str = "http://localhost:5173";

/// Project configuration stored in `.stock/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the product API; `/api/products` is appended.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Upper bound for each API call in seconds (default: 10).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Seconds between connectivity probes in `stock watch` (default: 5).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
    /// How long a probe waits for a TCP connection in milliseconds (default: 1500).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry settings for queued operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Failures after which an op is held back (absent = retry forever).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Minimum seconds between two attempts of the same op.
    #[serde(default)]
    pub min_interval_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_probe_interval_secs() -> u64 {
    5
}

fn default_probe_timeout_ms() -> u64 {
    1500
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            probe_interval_secs: default_probe_interval_secs(),
            probe_timeout_ms: default_probe_timeout_ms(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Creates a config pointing at the given API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidApiUrl`] unless the URL is http(s) with a host.
    pub fn new(api_url: &str) -> Result<Self> {
        validate_api_url(api_url)?;
        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            ..Config::default()
        })
    }

    /// Loads configuration from the given `.stock/` directory.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to the given `.stock/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// The API URL to use, honoring the `STOCK_API_URL` override.
    pub fn effective_api_url(&self) -> String {
        env::api_url().unwrap_or_else(|| self.api_url.clone())
    }

    /// Never zero: a zero timeout would fail every API call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            min_interval: Duration::from_secs(self.retry.min_interval_secs),
        }
    }
}

/// Checks that `url` can serve as the API base.
///
/// Uses the same parser as the HTTP client, so a URL accepted here never
/// fails later when a command connects.
pub fn validate_api_url(url: &str) -> Result<()> {
    parse_base_url(url)
        .map(|_| ())
        .map_err(|_| Error::InvalidApiUrl(url.to_string()))
}

/// Find the .stock directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Get the database path for a work directory
pub fn get_db_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DB_FILE_NAME)
}

/// Initialize a new .stock directory at the given path
pub fn init_work_dir(path: &Path, api_url: &str) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    let config = Config::new(api_url)?;
    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;
    write_gitignore(&work_dir)?;

    Ok(work_dir)
}

/// Keep the local cache out of version control.
fn write_gitignore(work_dir: &Path) -> Result<()> {
    let content = "# Local product cache and pending operations\ninventory.db\ninventory.db-*\n";
    fs::write(work_dir.join(GITIGNORE_FILE_NAME), content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
