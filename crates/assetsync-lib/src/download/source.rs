use crate::asset::Asset;
use crate::error::AssetSyncError;
use crate::manifest::Platform;
use eyre::{Result, WrapErr};
use std::future::Future;
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str =
    "UnityPlayer/2019.4.31f1 (UnityWebRequest/1.0, libcurl/7.75.0-DEV)";

/// Where asset bodies come from.
///
/// Any error is treated as a transient network failure and defers the asset
/// to the next pass.
pub trait AssetSource: Send + Sync + 'static {
    fn fetch(
        &self,
        asset: &Asset,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Fetches `<base_url>/<platform>/<prefix>/<hash>` over HTTP.
#[derive(Clone, Debug)]
pub struct HttpAssetSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpAssetSource {
    pub fn new(
        base_url: &str,
        platform: Platform,
        user_agent: &str,
    ) -> Result<Self, AssetSyncError> {
        let invalid = |reason: String| AssetSyncError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };

        let base = if base_url.ends_with('/') {
            Url::parse(base_url)
        } else {
            Url::parse(&format!("{base_url}/"))
        }
        .map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("URL cannot be used as a base".to_string()));
        }
        let endpoint = base
            .join(&format!("{}/", platform.dir_name()))
            .map_err(|e| invalid(e.to_string()))?;

        let client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn asset_url(&self, asset: &Asset) -> Result<Url, url::ParseError> {
        self.endpoint.join(asset.relative_path())
    }
}

impl AssetSource for HttpAssetSource {
    async fn fetch(&self, asset: &Asset, timeout: Duration) -> Result<Vec<u8>> {
        let url = self
            .asset_url(asset)
            .wrap_err_with(|| format!("Failed to build URL for {}", asset.relative_path()))?;
        tracing::trace!(url = %url, "Fetching");

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .wrap_err_with(|| format!("Request to {url} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("Unsuccessful response from {url}"))?;

        let body = response
            .bytes()
            .await
            .wrap_err_with(|| format!("Failed to read response body from {url}"))?;
        Ok(body.to_vec())
    }
}
