use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::DownloadOptions;
use crate::http::{CurlExecutor, CurlOptions};
use crate::retry::{RetryPolicy, DEFAULT_RETRY_PASSES};
use crate::segmenter::DEFAULT_PART_SIZE;

/// Retry ladder parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Passes after the initial one (each range gets at most `retry_passes + 1` attempts).
    pub retry_passes: u32,
    /// Delay in seconds before the first retry pass; doubles per pass (0 = none).
    #[serde(default)]
    pub base_delay_secs: f64,
    /// Maximum delay in seconds before any pass.
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

fn default_max_delay_secs() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_passes: DEFAULT_RETRY_PASSES,
            base_delay_secs: 0.0,
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> Result<RetryPolicy> {
        let base_delay = Duration::try_from_secs_f64(self.base_delay_secs)
            .with_context(|| format!("invalid retry.base_delay_secs: {}", self.base_delay_secs))?;
        Ok(RetryPolicy {
            retry_passes: self.retry_passes,
            base_delay,
            max_delay: Duration::from_secs(self.max_delay_secs),
        })
    }
}

/// HTTP client settings (`[client]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub connect_timeout_secs: u64,
    /// Hard per-request limit in seconds (absent = none).
    pub timeout_secs: Option<u64>,
    /// Abort a request whose throughput stays below this many bytes/s ...
    pub low_speed_limit: Option<u32>,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    pub follow_redirects: bool,
    pub max_redirections: u32,
    /// Headers sent with every request, beneath per-request headers.
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let curl = CurlOptions::default();
        Self {
            connect_timeout_secs: curl.connect_timeout.as_secs(),
            timeout_secs: curl.timeout.map(|d| d.as_secs()),
            low_speed_limit: curl.low_speed_limit,
            low_speed_time_secs: curl.low_speed_time.as_secs(),
            follow_redirects: curl.follow_redirects,
            max_redirections: curl.max_redirections,
            headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: self.timeout_secs.map(Duration::from_secs),
            low_speed_limit: self.low_speed_limit,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            follow_redirects: self.follow_redirects,
            max_redirections: self.max_redirections,
        }
    }

    /// Builds the curl executor with the configured global headers.
    pub fn executor(&self) -> CurlExecutor {
        let mut exec = CurlExecutor::new(self.curl_options());
        for (k, v) in &self.headers {
            exec.set_global_header(k, v);
        }
        exec
    }
}

/// Global configuration loaded from `~/.config/segfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegfetchConfig {
    /// Range size in bytes for segmented downloads.
    #[serde(default = "default_part_size")]
    pub part_size: u64,
    /// Reserve the full length on disk before fetching ranges.
    #[serde(default)]
    pub preallocate: bool,
    /// Optional retry ladder; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub client: ClientConfig,
}

fn default_part_size() -> u64 {
    DEFAULT_PART_SIZE
}

impl Default for SegfetchConfig {
    fn default() -> Self {
        Self {
            part_size: DEFAULT_PART_SIZE,
            preallocate: false,
            retry: None,
            client: ClientConfig::default(),
        }
    }
}

impl SegfetchConfig {
    /// Download options from this config. Fails on a zero part size.
    pub fn download_options(&self) -> Result<DownloadOptions> {
        let part_size =
            NonZeroU64::new(self.part_size).context("part_size must be greater than 0")?;
        let retry = match &self.retry {
            Some(r) => r.policy()?,
            None => RetryPolicy::default(),
        };
        Ok(DownloadOptions {
            part_size,
            retry,
            preallocate: self.preallocate,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SegfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SegfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SegfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
