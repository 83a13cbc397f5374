use crate::asset::IdentityPolicy;
use crate::download::{DEFAULT_USER_AGENT, DownloadOptions};
use crate::manifest::{Locale, Platform};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://dragalialost.akamaized.net/dl/assetbundles";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding one sub-directory of manifest snapshots per platform.
    pub manifests_path: Option<PathBuf>,
    /// Each platform is stored below `<output_path>/<Platform>`.
    pub output_path: Option<PathBuf>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub locales: Vec<Locale>,
    #[serde(default)]
    pub identity: IdentityPolicy,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DownloadConfig {
    pub base_url: String,
    pub user_agent: String,
    pub max_concurrent: usize,
    pub timeout_secs: u64,
    pub degraded_concurrency: usize,
    pub timeout_multiplier: u32,
    pub max_mismatch_retries: Option<u32>,
    pub max_passes: Option<u32>,
    pub progress_interval_ms: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        let options = DownloadOptions::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_concurrent: options.max_concurrent,
            timeout_secs: options.timeout.as_secs(),
            degraded_concurrency: options.degraded_concurrency,
            timeout_multiplier: options.timeout_multiplier,
            max_mismatch_retries: options.max_mismatch_retries,
            max_passes: options.max_passes,
            progress_interval_ms: options.progress_interval.as_millis() as u64,
        }
    }
}

impl DownloadConfig {
    pub fn to_options(&self) -> DownloadOptions {
        DownloadOptions {
            max_concurrent: self.max_concurrent,
            timeout: Duration::from_secs(self.timeout_secs),
            degraded_concurrency: self.degraded_concurrency,
            timeout_multiplier: self.timeout_multiplier,
            max_mismatch_retries: self.max_mismatch_retries,
            max_passes: self.max_passes,
            progress_interval: Duration::from_millis(self.progress_interval_ms),
            ..DownloadOptions::default()
        }
    }
}
