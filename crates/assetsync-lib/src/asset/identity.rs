use super::Asset;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Decides when two assets count as the same member of a [`WorkSet`].
///
/// Equality is defined by the returned key: two assets are equal iff their
/// keys are equal, and the key's hash is the asset's hash code.
pub trait AssetIdentity {
    fn identity_key<'a>(&self, asset: &'a Asset) -> &'a str;
}

/// Unique per content hash; renamed or repeated files collapse into one.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByHash;

/// Unique per logical name; the first revision inserted wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct ByName;

impl AssetIdentity for ByHash {
    fn identity_key<'a>(&self, asset: &'a Asset) -> &'a str {
        asset.hash()
    }
}

impl AssetIdentity for ByName {
    fn identity_key<'a>(&self, asset: &'a Asset) -> &'a str {
        asset.name()
    }
}

/// Identity strategy selected from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// Keep every revision of every asset.
    #[default]
    ByHash,
    /// Keep only the newest revision of each named asset.
    ByName,
}

impl AssetIdentity for IdentityPolicy {
    fn identity_key<'a>(&self, asset: &'a Asset) -> &'a str {
        match self {
            IdentityPolicy::ByHash => ByHash.identity_key(asset),
            IdentityPolicy::ByName => ByName.identity_key(asset),
        }
    }
}

/// Insertion-ordered set of assets, unique under an [`AssetIdentity`].
///
/// Inserting an asset whose identity is already present is a no-op, so
/// feeding snapshots newest-first keeps the newest revision.
#[derive(Debug)]
pub struct WorkSet<I> {
    identity: I,
    seen: HashSet<String>,
    assets: Vec<Arc<Asset>>,
}

impl<I: AssetIdentity> WorkSet<I> {
    pub fn new(identity: I) -> Self {
        Self {
            identity,
            seen: HashSet::new(),
            assets: Vec::new(),
        }
    }

    /// Returns `true` if the asset was not yet a member.
    pub fn insert(&mut self, asset: Arc<Asset>) -> bool {
        let key = self.identity.identity_key(&asset);
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string());
        self.assets.push(asset);
        true
    }

    pub fn union_with(&mut self, assets: impl IntoIterator<Item = Arc<Asset>>) {
        for asset in assets {
            self.insert(asset);
        }
    }

    pub fn contains(&self, asset: &Asset) -> bool {
        self.seen.contains(self.identity.identity_key(asset))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Asset>> {
        self.assets.iter()
    }

    pub fn into_assets(self) -> Vec<Arc<Asset>> {
        self.assets
    }
}
