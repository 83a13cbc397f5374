use super::counters::EngineCounters;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing;

/// Megabytes (10^6 bytes) with one decimal.
pub fn human_readable_megabytes(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / 1e6)
}

pub fn formatted_percent(numerator: u64, denominator: u64) -> String {
    if denominator == 0 {
        return "100.00%".to_string();
    }
    format!("{:.2}%", numerator as f64 * 100.0 / denominator as f64)
}

/// `hh:mm:ss`; hours are not wrapped at 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

pub(crate) struct ProgressObserver {
    pub counters: Arc<EngineCounters>,
    pub total_assets: usize,
    pub total_bytes: u64,
    pub poll_interval: Duration,
    pub log_interval: Duration,
    pub started: Instant,
}

impl ProgressObserver {
    /// Polls the counters until every asset of the pass reached a terminal
    /// state, logging a progress line every `log_interval`.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.poll_interval);
            let mut last_log = Instant::now();
            loop {
                ticker.tick().await;
                let snapshot = self.counters.snapshot();
                let drained = snapshot.is_drained(self.total_assets);

                if drained || last_log.elapsed() >= self.log_interval {
                    last_log = Instant::now();
                    tracing::info!(
                        "Download progress: {}/{} MB, ({}/{}) assets, {} failed, {} ({})",
                        human_readable_megabytes(snapshot.downloaded_bytes),
                        human_readable_megabytes(self.total_bytes),
                        snapshot.downloaded_assets,
                        self.total_assets,
                        snapshot.failed_assets,
                        formatted_percent(snapshot.downloaded_assets, self.total_assets as u64),
                        format_elapsed(self.started.elapsed())
                    );
                }

                if drained {
                    break;
                }
            }
        })
    }
}
