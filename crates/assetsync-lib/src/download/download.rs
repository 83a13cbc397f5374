use super::counters::EngineCounters;
use super::progress::{ProgressObserver, format_elapsed};
use super::source::AssetSource;
use super::types::{DownloadOptions, FetchOutcome, PassSettings, PassSummary, SyncSummary};
use crate::asset::{Asset, ByHash, WorkSet};
use crate::error::AssetSyncError;
use crate::store::LocalStore;
use crate::verification::Sha256Verifier;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Brings a [`LocalStore`] up to date with a list of assets.
pub struct Downloader<S> {
    source: Arc<S>,
    store: LocalStore,
    options: DownloadOptions,
}

impl<S: AssetSource> Downloader<S> {
    pub fn new(source: S, store: LocalStore, options: DownloadOptions) -> Self {
        Self {
            source: Arc::new(source),
            store,
            options,
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Downloads every asset that is not already present and verified.
    ///
    /// Failed assets are re-driven in degraded passes until a pass finishes
    /// without failures, or until `max_passes` is exhausted.
    pub async fn download_files(
        &self,
        assets: Vec<Arc<Asset>>,
    ) -> Result<SyncSummary, AssetSyncError> {
        // Locale sets may share hashes; one task per file keeps writers disjoint.
        let mut unique = WorkSet::new(ByHash);
        unique.union_with(assets);
        let assets = unique.into_assets();

        let total = assets.len();
        info!(
            "Filtering out {} assets already present in {}...",
            total,
            self.store.root().display()
        );
        let mut pending = self
            .store
            .filter_missing(assets, self.options.max_concurrent)
            .await?;
        let skipped = total - pending.len();
        info!("{} assets already present, {} to download", skipped, pending.len());

        info!("Creating directories...");
        self.store
            .ensure_directories(pending.iter().map(|asset| asset.as_ref()))?;

        let started = Instant::now();
        let mut settings = PassSettings::initial(&self.options);
        let mut passes = Vec::new();
        let mut pass = 1;

        while !pending.is_empty() {
            let summary = self.run_pass(pass, settings, pending, started).await?;
            pending = summary.failed.clone();
            passes.push(summary);

            if pending.is_empty() {
                break;
            }
            if let Some(max_passes) = self.options.max_passes {
                if pass >= max_passes {
                    return Err(AssetSyncError::FetchExhausted {
                        remaining: pending.len(),
                        passes: pass,
                    });
                }
            }

            settings = settings.degrade(&self.options);
            pass += 1;
            warn!(
                "{} assets failed to download, retrying them with concurrency {} and a {}s timeout",
                pending.len(),
                settings.concurrency,
                settings.timeout.as_secs_f64()
            );
        }

        info!(
            "Asset download completed. Time elapsed: {}",
            format_elapsed(started.elapsed())
        );
        Ok(SyncSummary { skipped, passes })
    }

    async fn run_pass(
        &self,
        pass: u32,
        settings: PassSettings,
        assets: Vec<Arc<Asset>>,
        started: Instant,
    ) -> Result<PassSummary, AssetSyncError> {
        let counters = Arc::new(EngineCounters::default());
        let total_assets = assets.len();
        let total_bytes = assets.iter().map(|asset| asset.size()).sum();
        info!(
            pass,
            assets = total_assets,
            concurrency = settings.concurrency,
            timeout_secs = settings.timeout.as_secs_f64(),
            "Starting download pass"
        );

        let observer = ProgressObserver {
            counters: counters.clone(),
            total_assets,
            total_bytes,
            poll_interval: self.options.poll_interval,
            log_interval: self.options.progress_interval,
            started,
        }
        .spawn();

        let semaphore = Arc::new(Semaphore::new(settings.concurrency));
        let mut tasks = JoinSet::new();
        for asset in assets {
            tasks.spawn(fetch_asset(
                self.source.clone(),
                self.store.clone(),
                semaphore.clone(),
                counters.clone(),
                asset,
                settings,
                self.options.max_mismatch_retries,
            ));
        }

        let mut failed = Vec::new();
        let mut received_bytes = 0;
        while let Some(outcome) = tasks.join_next().await {
            match outcome {
                Ok(FetchOutcome::Verified(bytes)) => received_bytes += bytes,
                Ok(FetchOutcome::Failed(asset)) => failed.push(asset),
                Err(err) => {
                    // The counters will never drain once a task is lost.
                    observer.abort();
                    return Err(err.into());
                }
            }
        }
        observer.await?;

        let snapshot = counters.snapshot();
        Ok(PassSummary {
            pass,
            settings,
            assets: total_assets,
            downloaded_assets: snapshot.downloaded_assets,
            downloaded_bytes: snapshot.downloaded_bytes,
            received_bytes,
            failed,
        })
    }
}

/// Fetches, verifies and persists a single asset.
///
/// The concurrency slot covers the network fetch and the digest check; hash
/// mismatches are refetched while still holding it. The slot is released
/// before the file is written.
async fn fetch_asset<S: AssetSource>(
    source: Arc<S>,
    store: LocalStore,
    semaphore: Arc<Semaphore>,
    counters: Arc<EngineCounters>,
    asset: Arc<Asset>,
    settings: PassSettings,
    max_mismatch_retries: Option<u32>,
) -> FetchOutcome {
    let failed = |asset: Arc<Asset>| {
        counters.record_failed();
        FetchOutcome::Failed(asset)
    };

    let Ok(permit) = semaphore.acquire_owned().await else {
        return failed(asset);
    };

    let mut mismatches = 0u32;
    loop {
        tracing::debug!(path = asset.relative_path(), "Downloading");
        let body = match source.fetch(&asset, settings.timeout).await {
            Ok(body) => body,
            Err(err) => {
                drop(permit);
                warn!(
                    path = asset.relative_path(),
                    "Failed to download asset, it will be retried later: {:#}", err
                );
                return failed(asset);
            }
        };

        if let Err(err) = Sha256Verifier::check(*asset.hash_bytes(), &body) {
            mismatches += 1;
            warn!(
                path = asset.relative_path(),
                attempt = mismatches,
                "Asset was downloaded but did not have the expected hash, retrying: {}", err
            );
            if max_mismatch_retries.is_some_and(|max| mismatches > max) {
                drop(permit);
                return failed(asset);
            }
            continue;
        }

        drop(permit);
        if let Err(err) = store.write(&asset, &body).await {
            warn!(
                path = asset.relative_path(),
                "Failed to write asset, it will be retried later: {}", err
            );
            return failed(asset);
        }
        counters.record_verified(asset.size());
        tracing::debug!(path = asset.relative_path(), "Downloaded and verified");
        return FetchOutcome::Verified(body.len() as u64);
    }
}
