use crate::asset::Asset;
use crate::error::AssetSyncError;
use crate::verification::Sha256Verifier;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing;

/// Content-addressed directory of assets laid out as `<root>/<prefix>/<hash>`.
#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, asset: &Asset) -> PathBuf {
        self.root.join(asset.hash_prefix()).join(asset.hash())
    }

    /// Returns `true` iff the asset's file exists and its SHA-256 matches.
    ///
    /// The whole file is read and hashed on the blocking pool. Unreadable
    /// files count as absent.
    pub async fn exists(&self, asset: &Asset) -> Result<bool, AssetSyncError> {
        let path = self.path_for(asset);
        let expected = *asset.hash_bytes();

        let verified = tokio::task::spawn_blocking(move || match std::fs::read(&path) {
            Ok(content) => {
                let valid = Sha256Verifier::matches(expected, &content);
                if !valid {
                    tracing::debug!(path = %path.display(), "File exists with incorrect digest");
                }
                valid
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), "Failed to read existing file: {}", e);
                }
                false
            }
        })
        .await?;

        Ok(verified)
    }

    /// Returns the assets that are absent or corrupt, preserving input order.
    ///
    /// At most `parallelism` files are verified at the same time.
    pub async fn filter_missing(
        &self,
        assets: Vec<Arc<Asset>>,
        parallelism: usize,
    ) -> Result<Vec<Arc<Asset>>, AssetSyncError> {
        let checks = stream::iter(assets)
            .map(|asset| async move {
                let present = self.exists(&asset).await?;
                Ok::<_, AssetSyncError>((asset, present))
            })
            .buffered(parallelism.max(1))
            .collect::<Vec<_>>()
            .await;

        let mut missing = Vec::new();
        for check in checks {
            let (asset, present) = check?;
            if present {
                tracing::trace!(path = asset.relative_path(), "Already present, skipping");
            } else {
                missing.push(asset);
            }
        }
        Ok(missing)
    }

    /// Creates one shard directory per distinct hash prefix.
    pub fn ensure_directories<'a>(
        &self,
        assets: impl IntoIterator<Item = &'a Asset>,
    ) -> Result<(), AssetSyncError> {
        for prefix in assets.into_iter().map(Asset::hash_prefix).unique() {
            let dir = self.root.join(prefix);
            std::fs::create_dir_all(&dir).map_err(|e| {
                AssetSyncError::DownloadDirectoryCreation {
                    path: dir.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    /// Writes the asset's content, replacing any existing file.
    pub async fn write(&self, asset: &Asset, content: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(self.path_for(asset), content).await
    }

    /// Copies assets that `other` already holds and this store lacks.
    ///
    /// Only assets whose hash appears in `other_assets` are considered.
    /// Returns the number of files copied.
    pub async fn seed_from(
        &self,
        other: &LocalStore,
        assets: &[Arc<Asset>],
        other_assets: &[Arc<Asset>],
    ) -> Result<usize, AssetSyncError> {
        let other_hashes: HashSet<&str> = other_assets.iter().map(|asset| asset.hash()).collect();
        let shared = assets
            .iter()
            .filter(|asset| other_hashes.contains(asset.hash()))
            .unique_by(|asset| asset.hash().to_string())
            .collect::<Vec<_>>();

        tracing::info!(
            "Copying up to {} assets shared with {}",
            shared.len(),
            other.root.display()
        );

        let mut copied = 0;
        for asset in shared {
            let source = other.path_for(asset);
            let target = self.path_for(asset);
            if tokio::fs::try_exists(&target).await? || !tokio::fs::try_exists(&source).await? {
                continue;
            }

            self.ensure_directories([asset.as_ref()])?;
            tokio::fs::copy(&source, &target).await?;
            tracing::trace!(path = asset.relative_path(), "Copied shared asset");
            copied += 1;
        }
        Ok(copied)
    }
}
