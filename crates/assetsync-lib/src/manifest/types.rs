use crate::asset::Asset;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub categories: Vec<AssetCategory>,
    pub raw_assets: Vec<Asset>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AssetCategory {
    pub assets: Vec<Asset>,
}

impl Manifest {
    /// Every asset of every category, followed by the raw assets.
    pub fn all_assets(&self) -> impl Iterator<Item = &Asset> {
        self.categories
            .iter()
            .flat_map(|category| category.assets.iter())
            .chain(self.raw_assets.iter())
    }

    pub fn into_all_assets(self) -> impl Iterator<Item = Asset> {
        self.categories
            .into_iter()
            .flat_map(|category| category.assets)
            .chain(self.raw_assets)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Locale {
    Jp,
    EnUs,
    EnEu,
    ZhCn,
    ZhTw,
}

impl Locale {
    pub fn manifest_file_name(self) -> &'static str {
        match self {
            Locale::Jp => "assetbundle.manifest.json",
            Locale::EnUs => "assetbundle.en_us.manifest.json",
            Locale::EnEu => "assetbundle.en_eu.manifest.json",
            Locale::ZhCn => "assetbundle.zh_cn.manifest.json",
            Locale::ZhTw => "assetbundle.zh_tw.manifest.json",
        }
    }
}

/// Normalizes a locale selection: the base `jp` manifest is always present
/// and `en_eu` depends on `en_us`.
pub fn expand_locales(requested: &[Locale]) -> Vec<Locale> {
    let mut locales = vec![Locale::Jp];
    locales.extend_from_slice(requested);
    if requested.contains(&Locale::EnEu) {
        locales.push(Locale::EnUs);
    }
    locales.sort();
    locales.dedup();
    locales
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Directory name used both in the manifest tree and in asset URLs.
    pub fn dir_name(self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
