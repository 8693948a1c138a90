//! Helpers shared by the full-stack tests.

#![allow(dead_code)]

use seed_core::{Driver, Manifest, RunReport, SeedConfig, Settings, SyncEngine, SyncOptions};
use seed_fs::ChecksumAlgorithm;
use seed_fs::checksum::compute_content_checksum;
use seed_test_utils::fixtures::{TestDataDir, gzip};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REPOSITORY: &str = "seed-data";
/// `Basic base64("user:pass")`
pub const AUTH: &str = "Basic dXNlcjpwYXNz";

/// Mount search and download mocks for one artifact.
///
/// `fetches` is the exact number of downloads the test expects; wiremock
/// verifies it when the server is dropped.
pub async fn publish(server: &MockServer, artifact: &str, content: &[u8], fetches: u64) {
    let compressed = gzip(content);
    let md5 = compute_content_checksum(ChecksumAlgorithm::Md5, &compressed);
    let sha256 = compute_content_checksum(ChecksumAlgorithm::Sha256, &compressed);

    Mock::given(method("GET"))
        .and(path("/service/rest/v1/search"))
        .and(query_param("repository", REPOSITORY))
        .and(query_param("name", artifact))
        .and(header("Authorization", AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "repository": REPOSITORY,
                "name": artifact,
                "assets": [{
                    "path": artifact,
                    "checksum": { "md5": md5.hex(), "sha256": sha256.hex() }
                }]
            }],
            "continuationToken": null
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/repository/{REPOSITORY}/{artifact}")))
        .and(header("Authorization", AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(compressed))
        .expect(fetches)
        .mount(server)
        .await;
}

/// Settings pointing at `server` with the manifest and data folder of `dir`.
pub fn settings(dir: &TestDataDir, server: &MockServer) -> Settings {
    Settings {
        input: Some(dir.root().join("manifest.json")),
        data_folder: Some(dir.data_folder().to_native()),
        url: Some(server.uri()),
        repository: Some(REPOSITORY.into()),
        username: Some("user".into()),
        password: Some("pass".into()),
        timeout_secs: Some(10),
        lock_timeout_secs: Some(2),
        ..Settings::default()
    }
}

/// Load the manifest and run the whole pipeline on a blocking thread.
pub async fn run(config: SeedConfig, options: SyncOptions) -> seed_core::Result<RunReport> {
    tokio::task::spawn_blocking(move || {
        let manifest = Manifest::load(&config.manifest)?;
        let engine = SyncEngine::from_config(&config).with_options(options);
        Driver::new(engine).run(&manifest)
    })
    .await
    .expect("sync task panicked")
}
