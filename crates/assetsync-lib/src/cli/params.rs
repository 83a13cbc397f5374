use crate::asset::IdentityPolicy;
use crate::download::DownloadOptions;
use crate::manifest::{Locale, Platform};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub manifests_path: PathBuf,
    pub output_path: PathBuf,
    pub platforms: Vec<Platform>,
    /// Expanded locale list; always starts with the base manifest.
    pub locales: Vec<Locale>,
    pub identity: IdentityPolicy,
}

impl SyncPlan {
    pub fn platform_output(&self, platform: Platform) -> PathBuf {
        self.output_path.join(platform.dir_name())
    }
}

#[derive(Debug, Clone)]
pub struct SyncParams {
    pub plan: SyncPlan,
    pub base_url: String,
    pub user_agent: String,
    pub options: DownloadOptions,
}

#[derive(Debug, Clone)]
pub struct VerifyParams {
    pub plan: SyncPlan,
    pub checking_parallelism: usize,
}
