use assert_fs::TempDir;
use assert_fs::prelude::*;
use assetsync_e2e_tests::{
    hash_of, init_tracing, mount_asset, relative_path_of, sync_command, write_manifest,
};
use assetsync_lib::cli::{
    Command, PlatformSyncReport, ResolvedCommand, SourceArgs, resolve_command, run_sync,
    run_verify,
};
use assetsync_lib::error::AssetSyncError;
use assetsync_lib::manifest::{Locale, Platform};
use predicates::prelude::*;
use sha2::{Digest, Sha256};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn sync(command: Command) -> Result<Vec<PlatformSyncReport>, AssetSyncError> {
    match resolve_command(command)? {
        ResolvedCommand::Sync(params) => run_sync(params).await,
        _ => unreachable!("Resolved command type mismatch"),
    }
}

fn write_two_snapshots(manifests: &TempDir) {
    write_manifest(
        manifests.path(),
        Platform::Android,
        "20220101_1.0.0",
        Locale::Jp,
        &[("ui/title", "title v1"), ("sound/bgm", "bgm")],
    )
    .unwrap();
    write_manifest(
        manifests.path(),
        Platform::Android,
        "20220101_1.0.0",
        Locale::EnUs,
        &[("text/en", "english text")],
    )
    .unwrap();
    write_manifest(
        manifests.path(),
        Platform::Android,
        "20230101_2.0.0",
        Locale::Jp,
        &[("ui/title", "title v2"), ("sound/bgm", "bgm")],
    )
    .unwrap();
    write_manifest(
        manifests.path(),
        Platform::Android,
        "20230101_2.0.0",
        Locale::EnUs,
        &[("text/en", "english text"), ("ui/title", "title v2")],
    )
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_sync_downloads_every_revision_and_verifies_digests() {
    init_tracing();

    let manifests = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_two_snapshots(&manifests);

    let server = MockServer::start().await;
    for content in ["title v1", "title v2", "bgm", "english text"] {
        mount_asset(&server, Platform::Android, content, 1).await;
    }

    let reports = sync(sync_command(
        manifests.path(),
        output.path(),
        &server.uri(),
        vec![Platform::Android],
        vec![Locale::EnUs],
        false,
    ))
    .await
    .expect("Sync should succeed");

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].summary.downloaded_assets(), 4);

    for content in ["title v1", "title v2", "bgm", "english text"] {
        let file = output.child(format!("Android/{}", relative_path_of(content)));
        file.assert(predicate::path::is_file());
        let bytes = std::fs::read(file.path()).unwrap();
        assert_eq!(bytes, content.as_bytes());
        assert_eq!(
            data_encoding::BASE32_NOPAD.encode(&Sha256::digest(&bytes)),
            hash_of(content)
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_second_sync_makes_no_requests() {
    init_tracing();

    let manifests = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_two_snapshots(&manifests);

    let server = MockServer::start().await;
    for content in ["title v1", "title v2", "bgm", "english text"] {
        mount_asset(&server, Platform::Android, content, 1).await;
    }

    for _ in 0..2 {
        sync(sync_command(
            manifests.path(),
            output.path(),
            &server.uri(),
            vec![Platform::Android],
            vec![Locale::EnUs],
            false,
        ))
        .await
        .expect("Sync should succeed");
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4, "Second sync should not hit the network");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_skip_old_assets_downloads_only_newest_revision() {
    init_tracing();

    let manifests = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_two_snapshots(&manifests);

    let server = MockServer::start().await;
    mount_asset(&server, Platform::Android, "title v1", 0).await;
    for content in ["title v2", "bgm", "english text"] {
        mount_asset(&server, Platform::Android, content, 1).await;
    }

    sync(sync_command(
        manifests.path(),
        output.path(),
        &server.uri(),
        vec![Platform::Android],
        vec![Locale::EnUs],
        true,
    ))
    .await
    .expect("Sync should succeed");

    output
        .child(format!("Android/{}", relative_path_of("title v1")))
        .assert(predicate::path::missing());
    output
        .child(format!("Android/{}", relative_path_of("title v2")))
        .assert(predicate::path::is_file());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_corrupted_file_is_repaired() {
    init_tracing();

    let manifests = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_manifest(
        manifests.path(),
        Platform::Android,
        "20230101_2.0.0",
        Locale::Jp,
        &[("a", "intact"), ("b", "damaged")],
    )
    .unwrap();

    let intact = output.child(format!("Android/{}", relative_path_of("intact")));
    intact.write_str("intact").unwrap();
    let damaged = output.child(format!("Android/{}", relative_path_of("damaged")));
    damaged.write_str("bit rot").unwrap();

    let server = MockServer::start().await;
    mount_asset(&server, Platform::Android, "intact", 0).await;
    mount_asset(&server, Platform::Android, "damaged", 1).await;

    let reports = sync(sync_command(
        manifests.path(),
        output.path(),
        &server.uri(),
        vec![Platform::Android],
        vec![Locale::Jp],
        false,
    ))
    .await
    .expect("Sync should succeed");

    assert_eq!(reports[0].summary.skipped, 1);
    damaged.assert("damaged");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_invalid_manifest_aborts_before_any_request() {
    init_tracing();

    let manifests = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_two_snapshots(&manifests);
    manifests
        .child("Android/20210101_0.9.0/assetbundle.manifest.json")
        .write_str("{\"categories\": [")
        .unwrap();
    manifests
        .child("Android/20210101_0.9.0/assetbundle.en_us.manifest.json")
        .write_str("{\"categories\": [], \"rawAssets\": []}")
        .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = sync(sync_command(
        manifests.path(),
        output.path(),
        &server.uri(),
        vec![Platform::Android],
        vec![Locale::EnUs],
        false,
    ))
    .await;

    assert!(
        matches!(result, Err(AssetSyncError::Manifest(_))),
        "Malformed manifest should abort the sync: {:?}",
        result
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_downloads_are_retried_serially() {
    init_tracing();

    let manifests = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_manifest(
        manifests.path(),
        Platform::Android,
        "20230101_2.0.0",
        Locale::Jp,
        &[("a", "flaky"), ("b", "steady")],
    )
    .unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path(format!(
            "/Android/{}",
            relative_path_of("flaky")
        )))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_asset(&server, Platform::Android, "flaky", 1).await;
    mount_asset(&server, Platform::Android, "steady", 1).await;

    let reports = sync(sync_command(
        manifests.path(),
        output.path(),
        &server.uri(),
        vec![Platform::Android],
        vec![Locale::Jp],
        false,
    ))
    .await
    .expect("Sync should succeed after a retry pass");

    let passes = &reports[0].summary.passes;
    assert_eq!(passes.len(), 2);
    assert_eq!(passes[0].failed.len(), 1);
    assert_eq!(passes[0].failed[0].hash(), hash_of("flaky"));
    assert_eq!(passes[1].assets, 1);
    assert_eq!(passes[1].settings.concurrency, 1);
    assert!(passes[1].settings.timeout > passes[0].settings.timeout);
    output
        .child(format!("Android/{}", relative_path_of("flaky")))
        .assert("flaky");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_ios_reuses_assets_shared_with_android() {
    init_tracing();

    let manifests = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    for platform in [Platform::Android, Platform::Ios] {
        let platform_only = format!("{} only", platform.dir_name());
        write_manifest(
            manifests.path(),
            platform,
            "20230101_2.0.0",
            Locale::Jp,
            &[("shared", "shared bundle"), ("specific", platform_only.as_str())],
        )
        .unwrap();
    }

    let server = MockServer::start().await;
    mount_asset(&server, Platform::Android, "shared bundle", 1).await;
    mount_asset(&server, Platform::Android, "Android only", 1).await;
    mount_asset(&server, Platform::Ios, "shared bundle", 0).await;
    mount_asset(&server, Platform::Ios, "iOS only", 1).await;

    let reports = sync(sync_command(
        manifests.path(),
        output.path(),
        &server.uri(),
        vec![Platform::Android, Platform::Ios],
        vec![Locale::Jp],
        false,
    ))
    .await
    .expect("Sync should succeed");

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].platform, Platform::Ios);
    assert_eq!(reports[1].seeded, 1);
    output
        .child(format!("iOS/{}", relative_path_of("shared bundle")))
        .assert("shared bundle");
    output
        .child(format!("iOS/{}", relative_path_of("iOS only")))
        .assert("iOS only");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_verify_reports_missing_assets_without_network() {
    init_tracing();

    let manifests = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_manifest(
        manifests.path(),
        Platform::Android,
        "20230101_2.0.0",
        Locale::Jp,
        &[("a", "present"), ("b", "absent"), ("c", "corrupt")],
    )
    .unwrap();
    output
        .child(format!("Android/{}", relative_path_of("present")))
        .write_str("present")
        .unwrap();
    output
        .child(format!("Android/{}", relative_path_of("corrupt")))
        .write_str("tampered")
        .unwrap();

    let command = Command::Verify {
        source: SourceArgs {
            manifests_path: Some(manifests.path().to_string_lossy().into_owned()),
            output_path: Some(output.path().to_string_lossy().into_owned()),
            locales: vec![Locale::Jp],
            ..SourceArgs::default()
        },
    };
    let params = match resolve_command(command).expect("Verify should resolve") {
        ResolvedCommand::Verify(params) => params,
        _ => unreachable!("Resolved command type mismatch"),
    };
    let reports = run_verify(params).await.expect("Verify should succeed");

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].assets, 3);
    assert_eq!(reports[0].missing, 2);
}
