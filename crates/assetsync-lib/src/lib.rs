pub mod asset;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod manifest;
pub mod store;
pub mod verification;

pub use crate::asset::{Asset, AssetIdentity, IdentityPolicy, WorkSet};
pub use crate::config::Config;
pub use crate::error::AssetSyncError;
