use crate::asset::Asset;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct DownloadOptions {
    /// Simultaneous network fetches in the first pass; also the parallelism
    /// of the local verification sweep.
    pub max_concurrent: usize,
    /// Per-request timeout of the first pass.
    pub timeout: Duration,
    /// Concurrency of every retry pass.
    pub degraded_concurrency: usize,
    /// Factor applied to the timeout before each retry pass. Must be > 1.
    pub timeout_multiplier: u32,
    /// Hash mismatches tolerated per asset and pass. `None` retries forever.
    pub max_mismatch_retries: Option<u32>,
    /// Passes run before giving up. `None` keeps retrying forever.
    pub max_passes: Option<u32>,
    /// How often the progress observer checks whether the pass is drained.
    pub poll_interval: Duration,
    /// How often the progress observer logs a progress line.
    pub progress_interval: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 16,
            timeout: Duration::from_secs(100),
            degraded_concurrency: 1,
            timeout_multiplier: 2,
            max_mismatch_retries: None,
            max_passes: None,
            poll_interval: Duration::from_millis(10),
            progress_interval: Duration::from_secs(1),
        }
    }
}

/// Network settings of a single pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassSettings {
    pub concurrency: usize,
    pub timeout: Duration,
}

impl PassSettings {
    pub fn initial(options: &DownloadOptions) -> Self {
        Self {
            concurrency: options.max_concurrent.max(1),
            timeout: options.timeout,
        }
    }

    /// Settings for the pass after this one: less concurrency, more time.
    pub fn degrade(self, options: &DownloadOptions) -> Self {
        Self {
            concurrency: options.degraded_concurrency.clamp(1, self.concurrency),
            timeout: self
                .timeout
                .saturating_mul(options.timeout_multiplier.max(2)),
        }
    }
}

/// Terminal result of one asset within a pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Verified(u64),
    Failed(Arc<Asset>),
}

#[derive(Clone, Debug)]
pub struct PassSummary {
    pub pass: u32,
    pub settings: PassSettings,
    pub assets: usize,
    pub downloaded_assets: u64,
    pub downloaded_bytes: u64,
    /// Body bytes actually received for verified assets.
    pub received_bytes: u64,
    pub failed: Vec<Arc<Asset>>,
}

#[derive(Clone, Debug, Default)]
pub struct SyncSummary {
    /// Assets already present with a matching digest.
    pub skipped: usize,
    pub passes: Vec<PassSummary>,
}

impl SyncSummary {
    pub fn downloaded_assets(&self) -> u64 {
        self.passes.iter().map(|pass| pass.downloaded_assets).sum()
    }

    pub fn downloaded_bytes(&self) -> u64 {
        self.passes.iter().map(|pass| pass.downloaded_bytes).sum()
    }

    pub fn received_bytes(&self) -> u64 {
        self.passes.iter().map(|pass| pass.received_bytes).sum()
    }
}
