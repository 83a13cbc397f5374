use crate::cli::params::VerifyParams;
use crate::error::AssetSyncError;
use crate::manifest::{Platform, collect_platform_assets};
use crate::store::LocalStore;
use tracing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformVerifyReport {
    pub platform: Platform,
    pub assets: usize,
    pub missing: usize,
}

/// Reports how many assets each platform's store lacks. Never touches the network.
pub async fn run_verify(
    params: VerifyParams,
) -> Result<Vec<PlatformVerifyReport>, AssetSyncError> {
    let VerifyParams {
        plan,
        checking_parallelism,
    } = params;

    let mut reports = Vec::new();
    for &platform in &plan.platforms {
        let assets = collect_platform_assets(
            &plan.manifests_path,
            platform,
            &plan.locales,
            plan.identity,
        )?;
        let total = assets.len();

        let store = LocalStore::new(plan.platform_output(platform));
        let missing = store.filter_missing(assets, checking_parallelism).await?;
        for asset in &missing {
            tracing::debug!(
                name = asset.name(),
                path = asset.relative_path(),
                "Missing or corrupt"
            );
        }

        tracing::info!(
            "{}: {}/{} assets present, {} missing or corrupt",
            platform,
            total - missing.len(),
            total,
            missing.len()
        );
        reports.push(PlatformVerifyReport {
            platform,
            assets: total,
            missing: missing.len(),
        });
    }

    Ok(reports)
}
