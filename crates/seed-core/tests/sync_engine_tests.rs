//! SyncEngine decision and materialization against in-memory fakes.

use pretty_assertions::assert_eq;
use rstest::rstest;
use seed_core::{
    ErrorKind, FetchReason, ManifestEntry, SyncEngine, SyncOptions, SyncOutcome,
};
use seed_fs::NormalizedPath;
use seed_test_utils::fakes::{Call, FakeWorld, Failure};

const LOCAL: &str = "/data/users/data.gz";
const DECOMPRESSED: &str = "/data/users/data";
const REMOTE: &str = "users/data.gz";

fn entry() -> ManifestEntry {
    ManifestEntry::new("users", "users/data")
}

fn engine(world: &FakeWorld) -> SyncEngine {
    SyncEngine::new(
        NormalizedPath::new("/data"),
        Box::new(world.repository()),
        Box::new(world.store()),
    )
}

#[test]
fn missing_local_is_downloaded_then_decompressed() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");

    let result = engine(&world).sync(&entry()).unwrap();

    assert_eq!(result.outcome, SyncOutcome::Downloaded);
    assert_eq!(result.reason, Some(FetchReason::Missing));
    assert_eq!(result.bytes_fetched, Some(4));
    assert_eq!(world.fetch_count(), 1);
    assert_eq!(world.decompress_count(), 1);
    assert_eq!(world.local_checksum(LOCAL).as_deref(), Some("abc123"));
    assert_eq!(world.decompressed_bytes(DECOMPRESSED).unwrap(), b"rows");
}

#[test]
fn missing_local_fetches_without_querying_remote_checksum() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");

    engine(&world).sync(&entry()).unwrap();

    assert_eq!(world.remote_checksum_count(), 0);
    assert_eq!(
        world.calls(),
        vec![
            Call::EnsureParent(LOCAL.into()),
            Call::Fetch {
                path: REMOTE.into(),
                destination: LOCAL.into()
            },
            Call::Decompress(LOCAL.into()),
        ]
    );
}

#[test]
fn matching_local_is_up_to_date_and_still_decompressed() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");
    world.put_local(LOCAL, b"rows", "abc123");

    let result = engine(&world).sync(&entry()).unwrap();

    assert_eq!(result.outcome, SyncOutcome::UpToDate);
    assert_eq!(result.reason, None);
    assert_eq!(result.bytes_fetched, None);
    assert_eq!(world.fetch_count(), 0);
    assert_eq!(world.decompress_count(), 1);
    assert_eq!(
        result.decompressed.as_ref().map(NormalizedPath::as_str),
        Some(DECOMPRESSED)
    );
}

#[test]
fn checksum_comparison_ignores_case() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "ABC123");
    world.put_local(LOCAL, b"rows", "abc123");

    let result = engine(&world).sync(&entry()).unwrap();

    assert_eq!(result.outcome, SyncOutcome::UpToDate);
}

#[test]
fn drift_refetches_and_converges_on_remote_checksum() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"fresh rows", "abc123");
    world.put_local(LOCAL, b"stale rows", "def456");

    let result = engine(&world).sync(&entry()).unwrap();

    assert_eq!(result.outcome, SyncOutcome::Downloaded);
    match result.reason {
        Some(FetchReason::Drifted { local, remote }) => {
            assert_eq!(local.hex(), "def456");
            assert_eq!(remote.hex(), "abc123");
        }
        other => panic!("expected drift, got {other:?}"),
    }
    assert_eq!(world.fetch_count(), 1);
    assert_eq!(world.local_checksum(LOCAL).as_deref(), Some("abc123"));
    assert_eq!(world.decompressed_bytes(DECOMPRESSED).unwrap(), b"fresh rows");
}

#[test]
fn second_sync_of_unchanged_artifact_is_up_to_date() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");
    let engine = engine(&world);

    let first = engine.sync(&entry()).unwrap();
    let after_first = world.decompressed_bytes(DECOMPRESSED).unwrap();
    let second = engine.sync(&entry()).unwrap();
    let after_second = world.decompressed_bytes(DECOMPRESSED).unwrap();

    assert_eq!(first.outcome, SyncOutcome::Downloaded);
    assert_eq!(second.outcome, SyncOutcome::UpToDate);
    assert_eq!(world.fetch_count(), 1);
    assert_eq!(world.decompress_count(), 2);
    assert_eq!(after_first, after_second);
}

#[test]
fn decompression_regenerates_from_current_compressed_content() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");
    world.put_local(LOCAL, b"rows", "abc123");
    let engine = engine(&world);

    engine.sync(&entry()).unwrap();
    // Local copy replaced behind the engine's back, same checksum
    world.put_local(LOCAL, b"rows v2", "abc123");
    engine.sync(&entry()).unwrap();

    assert_eq!(world.decompressed_bytes(DECOMPRESSED).unwrap(), b"rows v2");
}

#[rstest]
#[case::not_found(Failure::NotFound, ErrorKind::NotFound)]
#[case::transport(Failure::Transport, ErrorKind::Transport)]
fn failed_checksum_query_is_an_error_not_a_refetch(
    #[case] failure: Failure,
    #[case] expected: ErrorKind,
) {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");
    world.put_local(LOCAL, b"rows", "abc123");
    world.fail_checksum(REMOTE, failure);

    let error = engine(&world).sync(&entry()).unwrap_err();

    assert_eq!(error.kind(), expected);
    assert_eq!(world.fetch_count(), 0);
    assert_eq!(world.decompress_count(), 0);
}

#[rstest]
#[case::not_found(Failure::NotFound, ErrorKind::NotFound)]
#[case::transport(Failure::Transport, ErrorKind::Transport)]
fn failed_fetch_skips_decompression(#[case] failure: Failure, #[case] expected: ErrorKind) {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");
    world.fail_fetch(REMOTE, failure);

    let error = engine(&world).sync(&entry()).unwrap_err();

    assert_eq!(error.kind(), expected);
    assert_eq!(world.decompress_count(), 0);
}

#[test]
fn artifact_absent_remotely_is_not_found() {
    let world = FakeWorld::new();

    let error = engine(&world).sync(&entry()).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[test]
fn corrupt_local_file_is_corrupt_data() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");
    world.put_local(LOCAL, b"rows", "abc123");
    world.fail_decompress(LOCAL, Failure::Corrupt);

    let error = engine(&world).sync(&entry()).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::CorruptData);
}

#[test]
fn dry_run_reports_would_download_and_writes_nothing() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");
    let engine = engine(&world).with_options(SyncOptions { dry_run: true });

    let result = engine.sync(&entry()).unwrap();

    assert_eq!(result.outcome, SyncOutcome::WouldDownload);
    assert_eq!(result.decompressed, None);
    assert_eq!(world.fetch_count(), 0);
    assert_eq!(world.decompress_count(), 0);
    assert!(world.local_bytes(LOCAL).is_none());
}

#[test]
fn dry_run_of_current_artifact_is_up_to_date() {
    let world = FakeWorld::new();
    world.put_remote(REMOTE, b"rows", "abc123");
    world.put_local(LOCAL, b"rows", "abc123");
    let engine = engine(&world).with_options(SyncOptions { dry_run: true });

    let result = engine.sync(&entry()).unwrap();

    assert_eq!(result.outcome, SyncOutcome::UpToDate);
    assert_eq!(world.decompress_count(), 0);
}

#[test]
fn nested_paths_keep_their_directory_structure() {
    let world = FakeWorld::new();
    world.put_remote("orders/2024/q1/data.gz", b"q1", "aa11");

    let result = engine(&world)
        .sync(&ManifestEntry::new("orders", "orders/2024/q1/data"))
        .unwrap();

    assert_eq!(result.compressed.as_str(), "/data/orders/2024/q1/data.gz");
    assert_eq!(
        world.decompressed_bytes("/data/orders/2024/q1/data").unwrap(),
        b"q1"
    );
}

#[test]
fn unvalidated_escaping_entry_is_rejected_before_any_call() {
    let world = FakeWorld::new();

    let error = engine(&world)
        .sync(&ManifestEntry::new("", "../outside"))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Parse);
    assert!(world.calls().is_empty());
}
