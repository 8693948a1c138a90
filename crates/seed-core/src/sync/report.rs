//! Result types for sync operations

use chrono::{DateTime, Utc};
use serde::Serialize;

use seed_fs::{Checksum, NormalizedPath};

use crate::ManifestEntry;

/// What happened to one entry. Every variant is a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The artifact was fetched, then decompressed
    Downloaded,
    /// The local copy matched the repository; only decompressed
    UpToDate,
    /// Dry run: a fetch would have happened
    WouldDownload,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::Downloaded => "downloaded",
            SyncOutcome::UpToDate => "up to date",
            SyncOutcome::WouldDownload => "would download",
        }
    }
}

/// Why a fetch is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FetchReason {
    /// No compressed file exists locally
    Missing,
    /// The local checksum differs from the one the repository reports
    Drifted {
        #[serde(serialize_with = "serialize_checksum")]
        local: Checksum,
        #[serde(serialize_with = "serialize_checksum")]
        remote: Checksum,
    },
}

fn serialize_checksum<S: serde::Serializer>(
    checksum: &Checksum,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(checksum)
}

/// Result of syncing one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub entry: ManifestEntry,
    pub outcome: SyncOutcome,
    /// Set when a fetch happened (or would have, on a dry run)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FetchReason>,
    /// Local path of the compressed artifact
    pub compressed: NormalizedPath,
    /// Local path of the decompressed artifact; `None` on a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decompressed: Option<NormalizedPath>,
    /// Bytes downloaded, when a fetch happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_fetched: Option<u64>,
}

/// Report of a completed run, results in manifest order.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub results: Vec<SyncResult>,
}

impl RunReport {
    fn count(&self, outcome: SyncOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn downloaded(&self) -> usize {
        self.count(SyncOutcome::Downloaded)
    }

    pub fn up_to_date(&self) -> usize {
        self.count(SyncOutcome::UpToDate)
    }

    pub fn would_download(&self) -> usize {
        self.count(SyncOutcome::WouldDownload)
    }

    /// Total bytes fetched across all entries.
    pub fn bytes_fetched(&self) -> u64 {
        self.results.iter().filter_map(|r| r.bytes_fetched).sum()
    }

    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
