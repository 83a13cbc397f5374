use super::types::{Locale, Platform};
use super::{ManifestError, load_manifest};
use crate::asset::{Asset, AssetIdentity, IdentityPolicy, WorkSet};
use crate::error::AssetSyncError;
use itertools::Itertools;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing;

/// Lists the snapshot directories below `platform_dir`, newest first.
///
/// Snapshot names start with a sortable timestamp, so a descending name
/// comparison orders them from newest to oldest.
pub fn list_snapshot_dirs(platform_dir: &Path) -> Result<Vec<PathBuf>, AssetSyncError> {
    let entries =
        std::fs::read_dir(platform_dir).map_err(|e| AssetSyncError::ManifestDirectory {
            path: platform_dir.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }

    Ok(dirs
        .into_iter()
        .sorted_by(|a, b| b.file_name().cmp(&a.file_name()))
        .collect())
}

/// Human-readable part of a `<timestamp>_<label>` snapshot directory name.
pub fn snapshot_label(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('_') {
        Some((_, label)) => label.to_string(),
        None => name,
    }
}

/// Folds the requested manifests of every snapshot into work sets.
///
/// Each manifest file name gets its own set so that locales do not shadow
/// each other under by-name identity; the per-file sets are concatenated in
/// the order the names were given. `snapshot_dirs` must be ordered newest
/// first. A missing or malformed manifest aborts the whole aggregation.
pub fn aggregate<I>(
    snapshot_dirs: &[PathBuf],
    manifest_files: &[&str],
    identity: I,
) -> Result<Vec<Arc<Asset>>, ManifestError>
where
    I: AssetIdentity + Clone,
{
    let mut sets: Vec<WorkSet<I>> = manifest_files
        .iter()
        .map(|_| WorkSet::new(identity.clone()))
        .collect();

    for (index, snapshot_dir) in snapshot_dirs.iter().enumerate() {
        tracing::debug!(
            snapshot = %snapshot_label(snapshot_dir),
            "Parsing manifests ({}/{})",
            index + 1,
            snapshot_dirs.len()
        );

        for (file_name, set) in manifest_files.iter().zip(sets.iter_mut()) {
            let manifest = load_manifest(&snapshot_dir.join(file_name))?;
            set.union_with(manifest.into_all_assets().map(Arc::new));
        }
    }

    for (file_name, set) in manifest_files.iter().zip(sets.iter()) {
        tracing::debug!(manifest = file_name, assets = set.len(), "Collected assets");
    }

    Ok(sets.into_iter().flat_map(WorkSet::into_assets).collect())
}

/// Aggregates every snapshot of one platform below `manifests_root`.
pub fn collect_platform_assets(
    manifests_root: &Path,
    platform: Platform,
    locales: &[Locale],
    identity: IdentityPolicy,
) -> Result<Vec<Arc<Asset>>, AssetSyncError> {
    let platform_dir = manifests_root.join(platform.dir_name());
    let snapshot_dirs = list_snapshot_dirs(&platform_dir)?;
    if snapshot_dirs.is_empty() {
        tracing::warn!("No manifest snapshots found in {}", platform_dir.display());
    }

    let manifest_files: Vec<&str> = locales
        .iter()
        .map(|locale| locale.manifest_file_name())
        .collect();

    tracing::info!(
        "Parsing {} manifest snapshots for {}...",
        snapshot_dirs.len(),
        platform
    );
    let assets = aggregate(&snapshot_dirs, &manifest_files, identity)?;
    tracing::info!("Collected {} assets for {}", assets.len(), platform);

    Ok(assets)
}
