use crate::asset::IdentityPolicy;
use crate::cli::args::{Command, DownloadOverrides, SourceArgs};
use crate::cli::params::{SyncParams, SyncPlan, VerifyParams};
use crate::config::{Config, load_config};
use crate::error::AssetSyncError;
use crate::manifest::{Platform, expand_locales};
use itertools::Itertools;
use std::path::PathBuf;

const DEFAULT_OUTPUT_DIR: &str = "DownloaderOutput";

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Sync(SyncParams),
    Verify(VerifyParams),
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, AssetSyncError> {
    match command {
        Command::Sync { source, download } => {
            let app_config = load_optional_config(&source)?;
            let plan = resolve_plan(source, &app_config)?;

            let DownloadOverrides {
                base_url,
                max_concurrent,
                timeout_secs,
                max_passes,
            } = download;
            let mut download_config = app_config.download;
            if let Some(base_url) = base_url {
                download_config.base_url = base_url;
            }
            if let Some(max_concurrent) = max_concurrent {
                download_config.max_concurrent = max_concurrent;
            }
            if let Some(timeout_secs) = timeout_secs {
                download_config.timeout_secs = timeout_secs;
            }
            if max_passes.is_some() {
                download_config.max_passes = max_passes;
            }

            for (name, value) in [
                ("max-concurrent", download_config.max_concurrent as u64),
                ("timeout-secs", download_config.timeout_secs),
                (
                    "degraded-concurrency",
                    download_config.degraded_concurrency as u64,
                ),
                ("progress-interval-ms", download_config.progress_interval_ms),
                (
                    "max-passes",
                    download_config.max_passes.map_or(1, u64::from),
                ),
            ] {
                if value == 0 {
                    return Err(AssetSyncError::CliArgumentValidation {
                        details: format!("{name} must be greater than 0."),
                    });
                }
            }
            if download_config.timeout_multiplier < 2 {
                return Err(AssetSyncError::CliArgumentValidation {
                    details: "timeout-multiplier must be at least 2.".to_string(),
                });
            }

            Ok(ResolvedCommand::Sync(SyncParams {
                plan,
                options: download_config.to_options(),
                base_url: download_config.base_url,
                user_agent: download_config.user_agent,
            }))
        }
        Command::Verify { source } => {
            let app_config = load_optional_config(&source)?;
            let checking_parallelism = app_config.download.max_concurrent.max(1);
            let plan = resolve_plan(source, &app_config)?;

            Ok(ResolvedCommand::Verify(VerifyParams {
                plan,
                checking_parallelism,
            }))
        }
    }
}

fn load_optional_config(source: &SourceArgs) -> Result<Config, AssetSyncError> {
    match &source.config_path {
        Some(config_path) => {
            tracing::info!("Loading configuration from {}", config_path);
            load_config(config_path)
        }
        None => Ok(Config::default()),
    }
}

fn resolve_plan(source: SourceArgs, app_config: &Config) -> Result<SyncPlan, AssetSyncError> {
    let manifests_path = source
        .manifests_path
        .map(PathBuf::from)
        .or_else(|| app_config.manifests_path.clone())
        .ok_or_else(|| AssetSyncError::CliArgumentValidation {
            details: "No manifest directory provided. Pass --manifests-dir or configure manifests_path."
                .to_string(),
        })?;
    if !manifests_path.is_dir() {
        return Err(AssetSyncError::ManifestDirectory {
            path: manifests_path,
            reason: "not a directory".to_string(),
        });
    }

    let output_path = source
        .output_path
        .map(PathBuf::from)
        .or_else(|| app_config.output_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let mut platforms: Vec<Platform> = if source.platforms.is_empty() {
        app_config.platforms.iter().copied().unique().collect()
    } else {
        source.platforms.into_iter().unique().collect()
    };
    if platforms.is_empty() {
        platforms.push(Platform::Android);
    }

    let requested_locales = if source.locales.is_empty() {
        &app_config.locales
    } else {
        &source.locales
    };
    if requested_locales.is_empty() {
        return Err(AssetSyncError::CliArgumentValidation {
            details: "No locales selected. Pass --locale or configure locales.".to_string(),
        });
    }

    let identity = if source.skip_old_assets {
        IdentityPolicy::ByName
    } else {
        app_config.identity
    };

    Ok(SyncPlan {
        manifests_path,
        output_path,
        platforms,
        locales: expand_locales(requested_locales),
        identity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Locale;
    use std::time::Duration;
    use tempfile::TempDir;

    fn source_args(manifests: &TempDir) -> SourceArgs {
        SourceArgs {
            manifests_path: Some(manifests.path().to_string_lossy().into_owned()),
            locales: vec![Locale::EnEu],
            ..SourceArgs::default()
        }
    }

    fn resolve_sync(
        source: SourceArgs,
        download: DownloadOverrides,
    ) -> Result<SyncParams, AssetSyncError> {
        match resolve_command(Command::Sync { source, download })? {
            ResolvedCommand::Sync(params) => Ok(params),
            _ => unreachable!("Resolved command type mismatch"),
        }
    }

    #[test]
    fn test_sync_defaults() {
        let manifests = TempDir::new().unwrap();
        let params = resolve_sync(source_args(&manifests), DownloadOverrides::default()).unwrap();

        assert_eq!(params.plan.platforms, vec![Platform::Android]);
        assert_eq!(
            params.plan.locales,
            vec![Locale::Jp, Locale::EnUs, Locale::EnEu]
        );
        assert_eq!(params.plan.identity, IdentityPolicy::ByHash);
        assert_eq!(params.plan.output_path, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(params.options.max_concurrent, 16);
        assert_eq!(params.options.max_passes, None);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let manifests = TempDir::new().unwrap();
        let config_path = manifests.path().join("assetsync.yaml");
        std::fs::write(
            &config_path,
            "output_path: from-config\nplatforms: [ios]\nidentity: by_hash\ndownload:\n  max_concurrent: 4\n  timeout_secs: 30\n",
        )
        .unwrap();

        let source = SourceArgs {
            config_path: Some(config_path.to_string_lossy().into_owned()),
            skip_old_assets: true,
            ..source_args(&manifests)
        };
        let download = DownloadOverrides {
            max_concurrent: Some(2),
            base_url: Some("http://localhost:9000/assets".to_string()),
            ..DownloadOverrides::default()
        };
        let params = resolve_sync(source, download).unwrap();

        assert_eq!(params.plan.output_path, PathBuf::from("from-config"));
        assert_eq!(params.plan.platforms, vec![Platform::Ios]);
        assert_eq!(params.plan.identity, IdentityPolicy::ByName);
        assert_eq!(params.options.max_concurrent, 2);
        assert_eq!(params.options.timeout, Duration::from_secs(30));
        assert_eq!(params.base_url, "http://localhost:9000/assets");
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let manifests = TempDir::new().unwrap();
        let download = DownloadOverrides {
            max_concurrent: Some(0),
            ..DownloadOverrides::default()
        };

        let err = resolve_sync(source_args(&manifests), download).unwrap_err();
        assert!(matches!(err, AssetSyncError::CliArgumentValidation { .. }));
    }

    #[test]
    fn test_missing_locales_are_rejected() {
        let manifests = TempDir::new().unwrap();
        let source = SourceArgs {
            locales: vec![],
            ..source_args(&manifests)
        };

        let err = resolve_sync(source, DownloadOverrides::default()).unwrap_err();
        assert!(matches!(err, AssetSyncError::CliArgumentValidation { .. }));
    }

    #[test]
    fn test_missing_manifest_directory_is_rejected() {
        let manifests = TempDir::new().unwrap();
        let source = SourceArgs {
            manifests_path: Some(
                manifests
                    .path()
                    .join("missing")
                    .to_string_lossy()
                    .into_owned(),
            ),
            ..source_args(&manifests)
        };

        let err = resolve_sync(source, DownloadOverrides::default()).unwrap_err();
        assert!(matches!(err, AssetSyncError::ManifestDirectory { .. }));
    }

    #[test]
    fn test_verify_uses_configured_parallelism() {
        let manifests = TempDir::new().unwrap();
        let command = Command::Verify {
            source: source_args(&manifests),
        };

        match resolve_command(command).unwrap() {
            ResolvedCommand::Verify(params) => assert_eq!(params.checking_parallelism, 16),
            _ => unreachable!("Resolved command type mismatch"),
        }
    }
}
