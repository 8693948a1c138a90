//! End-to-end integration test for the whole pipeline
//!
//! Settings -> SeedConfig -> Manifest -> Driver -> SyncEngine with the real
//! NexusClient (against wiremock) and the real FsStore (in a temp folder).

mod common;

use std::fs;

use common::{publish, run, settings};
use seed_core::{FetchReason, SyncOptions, SyncOutcome};
use seed_fs::ChecksumAlgorithm;
use seed_test_utils::fixtures::TestDataDir;
use wiremock::MockServer;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fresh_folder_is_populated_from_repository() {
    let server = MockServer::start().await;
    publish(&server, "users/data.gz", b"id,name\n1,ada\n2,grace\n", 1).await;
    publish(&server, "orders/2024/data.gz", b"id,total\n7,12.50\n", 1).await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data"), ("orders", "orders/2024/data")]);
    let config = settings(&dir, &server).resolve().unwrap();

    let report = run(config, SyncOptions::default()).await.unwrap();

    assert_eq!(report.downloaded(), 2);
    assert_eq!(report.results[0].reason, Some(FetchReason::Missing));
    assert_eq!(dir.read_data("users/data"), b"id,name\n1,ada\n2,grace\n");
    assert_eq!(dir.read_data("orders/2024/data"), b"id,total\n7,12.50\n");
    dir.assert_data_exists("users/data.gz");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rerun_is_idempotent_and_fetches_once() {
    let server = MockServer::start().await;
    publish(&server, "users/data.gz", b"rows", 1).await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data")]);
    let config = settings(&dir, &server).resolve().unwrap();

    let first = run(config.clone(), SyncOptions::default()).await.unwrap();
    let first_bytes = dir.read_data("users/data");
    let second = run(config, SyncOptions::default()).await.unwrap();

    assert_eq!(first.results[0].outcome, SyncOutcome::Downloaded);
    assert_eq!(second.results[0].outcome, SyncOutcome::UpToDate);
    assert_eq!(dir.read_data("users/data"), first_bytes);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn republished_artifact_is_fetched_again() {
    let server = MockServer::start().await;
    publish(&server, "users/data.gz", b"v1", 1).await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data")]);
    let config = settings(&dir, &server).resolve().unwrap();
    run(config.clone(), SyncOptions::default()).await.unwrap();
    server.verify().await;

    server.reset().await;
    publish(&server, "users/data.gz", b"v2", 1).await;
    let report = run(config, SyncOptions::default()).await.unwrap();

    assert!(matches!(
        report.results[0].reason,
        Some(FetchReason::Drifted { .. })
    ));
    assert_eq!(dir.read_data("users/data"), b"v2");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sha256_comparison_works_end_to_end() {
    let server = MockServer::start().await;
    publish(&server, "users/data.gz", b"rows", 1).await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data")]);
    let mut settings = settings(&dir, &server);
    settings.checksum = Some(ChecksumAlgorithm::Sha256);
    let config = settings.resolve().unwrap();

    run(config.clone(), SyncOptions::default()).await.unwrap();
    let report = run(config, SyncOptions::default()).await.unwrap();

    assert_eq!(report.results[0].outcome, SyncOutcome::UpToDate);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn manually_edited_output_is_regenerated() {
    let server = MockServer::start().await;
    publish(&server, "users/data.gz", b"rows", 1).await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data")]);
    let config = settings(&dir, &server).resolve().unwrap();

    run(config.clone(), SyncOptions::default()).await.unwrap();
    fs::write(dir.data_path("users/data"), b"hand edited").unwrap();
    let report = run(config, SyncOptions::default()).await.unwrap();

    assert_eq!(report.results[0].outcome, SyncOutcome::UpToDate);
    assert_eq!(dir.read_data("users/data"), b"rows");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dry_run_plans_without_writing() {
    let server = MockServer::start().await;
    publish(&server, "users/data.gz", b"rows", 0).await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data")]);
    let config = settings(&dir, &server).resolve().unwrap();

    let report = run(config, SyncOptions { dry_run: true }).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.would_download(), 1);
    assert!(!dir.data_folder().exists());
}
