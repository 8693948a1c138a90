//! Failure paths through the whole pipeline: every error aborts the run.

mod common;

use common::{REPOSITORY, publish, run, settings};
use seed_core::{Error, ErrorKind, SyncOptions};
use seed_test_utils::fixtures::{TestDataDir, gzip};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failing_entry_stops_the_run_before_later_entries() {
    let server = MockServer::start().await;
    publish(&server, "a/data.gz", b"a", 1).await;
    // b is not published at all
    publish(&server, "c/data.gz", b"c", 0).await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("a", "a/data"), ("b", "b/data"), ("c", "c/data")]);
    let config = settings(&dir, &server).resolve().unwrap();

    let error = run(config, SyncOptions::default()).await.unwrap_err();

    match &error {
        Error::Entry { index, path, .. } => {
            assert_eq!(*index, 2);
            assert_eq!(path, "b/data");
        }
        other => panic!("expected entry error, got {other:?}"),
    }
    assert_eq!(error.kind(), ErrorKind::NotFound);
    dir.assert_data_exists("a/data");
    dir.assert_data_missing("c/data.gz");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_checksum_query_does_not_trigger_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/rest/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/repository/{REPOSITORY}/users/data.gz")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(b"new")))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data")]);
    dir.write_data("users/data.gz", &gzip(b"cached"));
    let config = settings(&dir, &server).resolve().unwrap();

    let error = run(config, SyncOptions::default()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert_eq!(dir.read_data("users/data.gz"), gzip(b"cached"));
    dir.assert_data_missing("users/data");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wrong_credentials_are_transport_errors() {
    let server = MockServer::start().await;
    // Mocks require the right Authorization header; anything else is 404
    publish(&server, "users/data.gz", b"rows", 0).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data")]);
    let mut settings = settings(&dir, &server);
    settings.password = Some("wrong".into());
    let config = settings.resolve().unwrap();

    let error = run(config, SyncOptions::default()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport);
    assert!(error.to_string().contains("HTTP 401"), "{error}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn corrupt_download_is_corrupt_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/repository/{REPOSITORY}/users/data.gz")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"<html>proxy error</html>".to_vec()))
        .mount(&server)
        .await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/data")]);
    let config = settings(&dir, &server).resolve().unwrap();

    let error = run(config, SyncOptions::default()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::CorruptData);
    dir.assert_data_missing("users/data");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_manifest_makes_no_requests() {
    let server = MockServer::start().await;
    publish(&server, "users/data.gz", b"rows", 0).await;
    let dir = TestDataDir::new();
    dir.write_file(
        "manifest.json",
        br#"[{"collection": "users", "path": "users/data"}, {"path": "../escape"}]"#,
    );
    let config = settings(&dir, &server).resolve().unwrap();

    let error = run(config, SyncOptions::default()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Parse);
    assert_eq!(error.entry_index(), Some(2));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dotted_path_is_rejected_on_every_run() {
    let server = MockServer::start().await;
    publish(&server, "users/data.gz", b"rows", 0).await;
    let dir = TestDataDir::new();
    dir.write_manifest(&[("users", "users/./data")]);
    let config = settings(&dir, &server).resolve().unwrap();

    for _ in 0..2 {
        let error = run(config.clone(), SyncOptions::default()).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Parse);
        assert_eq!(error.entry_index(), Some(1));
    }
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    dir.assert_data_missing("users/data.gz");
}
