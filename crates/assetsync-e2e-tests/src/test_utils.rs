use assetsync_lib::cli::{Command, DownloadOverrides, SourceArgs};
use assetsync_lib::manifest::{Locale, Platform};
use data_encoding::BASE32_NOPAD;
use eyre::Result;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("assetsync_lib=debug")
        .with_test_writer()
        .try_init();
}

/// Content hash in the store's native encoding.
pub fn hash_of(content: &str) -> String {
    BASE32_NOPAD.encode(&Sha256::digest(content.as_bytes()))
}

/// `<prefix>/<hash>` of the given content.
pub fn relative_path_of(content: &str) -> String {
    let hash = hash_of(content);
    format!("{}/{}", &hash[..2], hash)
}

/// Writes `<root>/<Platform>/<snapshot>/<locale manifest>` listing
/// `(name, content)` pairs as assets.
pub fn write_manifest(
    manifests_root: &Path,
    platform: Platform,
    snapshot: &str,
    locale: Locale,
    assets: &[(&str, &str)],
) -> Result<()> {
    let dir = manifests_root.join(platform.dir_name()).join(snapshot);
    std::fs::create_dir_all(&dir)?;

    let (raw, categorized) = assets.split_at(assets.len() / 2);
    let entry = |(name, content): &(&str, &str)| {
        json!({"name": name, "hash": hash_of(content), "size": content.len()})
    };
    let manifest = json!({
        "categories": [{"name": "Default", "assets": categorized.iter().map(entry).collect::<Vec<_>>()}],
        "rawAssets": raw.iter().map(entry).collect::<Vec<_>>(),
    });

    std::fs::write(
        dir.join(locale.manifest_file_name()),
        serde_json::to_string_pretty(&manifest)?,
    )?;
    Ok(())
}

/// Serves `content` at its content-addressed URL and expects exactly
/// `expected_requests` requests for it.
pub async fn mount_asset(
    server: &MockServer,
    platform: Platform,
    content: &str,
    expected_requests: u64,
) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/{}/{}",
            platform.dir_name(),
            relative_path_of(content)
        )))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .expect(expected_requests)
        .mount(server)
        .await;
}

pub fn sync_command(
    manifests_root: &Path,
    output_root: &Path,
    base_url: &str,
    platforms: Vec<Platform>,
    locales: Vec<Locale>,
    skip_old_assets: bool,
) -> Command {
    Command::Sync {
        source: SourceArgs {
            config_path: None,
            manifests_path: Some(manifests_root.to_string_lossy().into_owned()),
            output_path: Some(output_root.to_string_lossy().into_owned()),
            platforms,
            locales,
            skip_old_assets,
        },
        download: DownloadOverrides {
            base_url: Some(base_url.to_string()),
            max_concurrent: Some(4),
            timeout_secs: Some(5),
            max_passes: Some(5),
        },
    }
}
