use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::EngineOptions;
use crate::network::NetworkQuality;
use crate::retry::RetryPolicy;
use crate::transport::CurlHttpClient;
use crate::url_model::DEFAULT_JOB_NAME_MAX;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per unit (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Replaces the built-in retryable keyword table when set.
    #[serde(default)]
    pub retryable_matchers: Option<Vec<String>>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 10,
            retryable_matchers: None,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let base = Duration::try_from_secs_f64(self.base_delay_secs.max(0.0))
            .unwrap_or(Duration::from_secs(1));
        let policy = RetryPolicy::new(
            self.max_attempts,
            base,
            Duration::from_secs(self.max_delay_secs),
        );
        match &self.retryable_matchers {
            Some(m) => policy.with_matchers(m),
            None => policy,
        }
    }
}

/// Global configuration loaded from `~/.config/batchsave/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchsaveConfig {
    /// Network quality hint used when the caller gives none ("4g", "3g", "2g", "slow-2g", "unknown").
    #[serde(default)]
    pub network_quality: NetworkQuality,
    /// Pause between individual saves on the sequential path, in milliseconds.
    pub sequential_delay_ms: u64,
    /// Maximum length of the sanitized job name used for archive filenames.
    pub max_job_name_len: usize,
    /// Abort the whole job on the first unit that fails for good.
    #[serde(default)]
    pub fail_fast: bool,
    /// Replace existing files in the output directory instead of numbering new ones.
    #[serde(default)]
    pub overwrite: bool,
    /// Connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,
    /// Total timeout per request, in seconds.
    pub request_timeout_secs: u64,
    /// Optional per-item size cap in bytes (None = no cap).
    #[serde(default)]
    pub max_item_bytes: Option<u64>,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for BatchsaveConfig {
    fn default() -> Self {
        Self {
            network_quality: NetworkQuality::Unknown,
            sequential_delay_ms: 1500,
            max_job_name_len: DEFAULT_JOB_NAME_MAX,
            fail_fast: false,
            overwrite: false,
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            max_item_bytes: None,
            retry: None,
        }
    }
}

impl BatchsaveConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_default()
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            fetch_policy: self.retry_policy(),
            sequential_delay: Duration::from_millis(self.sequential_delay_ms),
            fail_fast: self.fail_fast,
            max_job_name_len: self.max_job_name_len.max(1),
        }
    }

    pub fn http_client(&self) -> CurlHttpClient {
        CurlHttpClient::new()
            .with_timeouts(
                Duration::from_secs(self.connect_timeout_secs),
                Duration::from_secs(self.request_timeout_secs),
            )
            .with_max_bytes(self.max_item_bytes)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("batchsave")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BatchsaveConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BatchsaveConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BatchsaveConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
