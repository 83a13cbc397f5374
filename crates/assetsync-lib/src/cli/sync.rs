use crate::asset::Asset;
use crate::cli::params::SyncParams;
use crate::download::{Downloader, HttpAssetSource, SyncSummary};
use crate::error::AssetSyncError;
use crate::manifest::{Platform, collect_platform_assets};
use crate::store::LocalStore;
use std::sync::Arc;
use tracing;

#[derive(Debug, Clone)]
pub struct PlatformSyncReport {
    pub platform: Platform,
    pub assets: usize,
    /// Files copied from a platform synced earlier in the same run.
    pub seeded: usize,
    pub summary: SyncSummary,
}

pub async fn run_sync(params: SyncParams) -> Result<Vec<PlatformSyncReport>, AssetSyncError> {
    let SyncParams {
        plan,
        base_url,
        user_agent,
        options,
    } = params;

    let mut synced: Vec<(LocalStore, Vec<Arc<Asset>>)> = Vec::new();
    let mut reports = Vec::new();

    for &platform in &plan.platforms {
        let assets = collect_platform_assets(
            &plan.manifests_path,
            platform,
            &plan.locales,
            plan.identity,
        )?;

        let store = LocalStore::new(plan.platform_output(platform));
        let mut seeded = 0;
        for (other_store, other_assets) in &synced {
            seeded += store.seed_from(other_store, &assets, other_assets).await?;
        }
        if seeded > 0 {
            tracing::info!("Copied {} assets shared with previously synced platforms", seeded);
        }

        tracing::info!("Commencing {} download...", platform);
        let source = HttpAssetSource::new(&base_url, platform, &user_agent)?;
        let downloader = Downloader::new(source, store.clone(), options.clone());
        let summary = downloader.download_files(assets.clone()).await?;

        tracing::info!(
            "{}: {} assets, {} already present, {} downloaded in {} passes",
            platform,
            assets.len(),
            summary.skipped,
            summary.downloaded_assets(),
            summary.passes.len()
        );
        reports.push(PlatformSyncReport {
            platform,
            assets: assets.len(),
            seeded,
            summary,
        });
        synced.push((store, assets));
    }

    tracing::info!("Sync completed successfully");
    Ok(reports)
}
