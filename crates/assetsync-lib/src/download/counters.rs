use std::sync::atomic::{AtomicU64, Ordering};

/// Progress counters of one pass, shared between fetch tasks and the
/// progress observer. A fresh instance is created for every pass.
#[derive(Debug, Default)]
pub struct EngineCounters {
    downloaded_bytes: AtomicU64,
    downloaded_assets: AtomicU64,
    failed_assets: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub downloaded_bytes: u64,
    pub downloaded_assets: u64,
    pub failed_assets: u64,
}

impl CounterSnapshot {
    /// Every asset of the pass reached a terminal state.
    pub fn is_drained(&self, total_assets: usize) -> bool {
        self.downloaded_assets + self.failed_assets == total_assets as u64
    }
}

impl EngineCounters {
    /// Called only after the asset's file has been written.
    pub fn record_verified(&self, bytes: u64) {
        self.downloaded_bytes.fetch_add(bytes, Ordering::SeqCst);
        self.downloaded_assets.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_failed(&self) {
        self.failed_assets.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            downloaded_bytes: self.downloaded_bytes.load(Ordering::SeqCst),
            downloaded_assets: self.downloaded_assets.load(Ordering::SeqCst),
            failed_assets: self.failed_assets.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drained_counts_verified_and_failed() {
        let counters = EngineCounters::default();
        assert!(counters.snapshot().is_drained(0));

        counters.record_verified(10);
        counters.record_failed();
        let snapshot = counters.snapshot();

        assert_eq!(snapshot.downloaded_bytes, 10);
        assert!(!snapshot.is_drained(3));
        assert!(snapshot.is_drained(2));
    }
}
