//! SyncEngine implementation
//!
//! For one manifest entry the engine decides whether the locally cached
//! compressed artifact must be fetched again, fetches it if so, and then
//! always regenerates the decompressed artifact from it.
//!
//! The decision is delegated to the repository: a local copy is current
//! only when its checksum equals the checksum the repository reports.

use seed_fs::archive::GZIP_SUFFIX;
use seed_fs::{Checksum, FsStore, LocalStore, NormalizedPath, validate_artifact_path};
use seed_remote::{NexusClient, RepositoryClient};

use super::report::{FetchReason, SyncOutcome, SyncResult};
use crate::{ManifestEntry, Result, SeedConfig};

/// Options for sync operations
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// If true, decide only: no fetch, no decompression, no directory
    /// creation. Outcomes are reported as `WouldDownload` or `UpToDate`.
    pub dry_run: bool,
}

/// Fetch-or-skip decision for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    Fetch(FetchReason),
    /// The local copy matches the repository
    Skip { checksum: Checksum },
}

/// The planned work for one entry, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub entry: ManifestEntry,
    /// Artifact path in the repository (`<path>.gz`)
    pub remote_path: String,
    /// Local path of the compressed artifact
    pub compressed: NormalizedPath,
    pub decision: FetchDecision,
}

impl SyncPlan {
    pub fn needs_fetch(&self) -> bool {
        matches!(self.decision, FetchDecision::Fetch(_))
    }

    pub fn reason(&self) -> Option<&FetchReason> {
        match &self.decision {
            FetchDecision::Fetch(reason) => Some(reason),
            FetchDecision::Skip { .. } => None,
        }
    }
}

/// Engine for synchronizing manifest entries into the data folder
pub struct SyncEngine {
    /// Root of the local artifact layout
    data_folder: NormalizedPath,
    remote: Box<dyn RepositoryClient>,
    store: Box<dyn LocalStore>,
    options: SyncOptions,
}

impl SyncEngine {
    /// Create an engine over explicit collaborators.
    pub fn new(
        data_folder: NormalizedPath,
        remote: Box<dyn RepositoryClient>,
        store: Box<dyn LocalStore>,
    ) -> Self {
        Self {
            data_folder,
            remote,
            store,
            options: SyncOptions::default(),
        }
    }

    /// Create an engine talking to the configured Nexus repository and the
    /// real filesystem.
    pub fn from_config(config: &SeedConfig) -> Self {
        let remote = NexusClient::new(config.remote.clone()).with_robustness(config.robustness);
        let store = FsStore::new(config.remote.algorithm).with_robustness(config.robustness);
        Self::new(config.data_folder.clone(), Box::new(remote), Box::new(store))
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    pub fn data_folder(&self) -> &NormalizedPath {
        &self.data_folder
    }

    /// Local path of the compressed artifact for `entry`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-path error if `entry.path` could escape the data
    /// folder.
    pub fn compressed_path(&self, entry: &ManifestEntry) -> Result<NormalizedPath> {
        validate_artifact_path(&entry.path)?;
        Ok(self.data_folder.join(&entry.path).with_suffix(GZIP_SUFFIX))
    }

    /// Decide whether `entry` needs a fetch, without writing anything.
    ///
    /// A missing local file needs a fetch and the repository is not asked.
    /// Otherwise the repository checksum is queried; a failed query is an
    /// error, never an implicit re-fetch.
    pub fn plan(&self, entry: &ManifestEntry) -> Result<SyncPlan> {
        let compressed = self.compressed_path(entry)?;
        let remote_path = entry.remote_path();

        let decision = if !self.store.exists(&compressed) {
            tracing::debug!(path = %compressed, "No local copy");
            FetchDecision::Fetch(FetchReason::Missing)
        } else {
            let remote = self.remote.checksum(&remote_path)?;
            let local = self.store.checksum(&compressed)?;
            if local == remote {
                tracing::debug!(path = %compressed, checksum = %local, "Checksums match");
                FetchDecision::Skip { checksum: local }
            } else {
                tracing::debug!(path = %compressed, %local, %remote, "Checksum drift");
                FetchDecision::Fetch(FetchReason::Drifted { local, remote })
            }
        };

        Ok(SyncPlan {
            entry: entry.clone(),
            remote_path,
            compressed,
            decision,
        })
    }

    /// Sync one entry: fetch if needed, then decompress unconditionally.
    ///
    /// # Errors
    ///
    /// Fails on the first error from the checksum query, the fetch or the
    /// decompression. Nothing is retried.
    pub fn sync(&self, entry: &ManifestEntry) -> Result<SyncResult> {
        let plan = self.plan(entry)?;

        if self.options.dry_run {
            let outcome = if plan.needs_fetch() {
                SyncOutcome::WouldDownload
            } else {
                SyncOutcome::UpToDate
            };
            return Ok(SyncResult {
                entry: plan.entry,
                outcome,
                reason: plan.decision.into_reason(),
                compressed: plan.compressed,
                decompressed: None,
                bytes_fetched: None,
            });
        }

        let bytes_fetched = if plan.needs_fetch() {
            self.store.ensure_parent(&plan.compressed)?;
            let bytes = self.remote.fetch(&plan.remote_path, &plan.compressed)?;
            tracing::debug!(path = %plan.compressed, bytes, "Fetched");
            Some(bytes)
        } else {
            None
        };

        let decompressed = self.store.decompress(&plan.compressed)?;
        let outcome = if bytes_fetched.is_some() {
            SyncOutcome::Downloaded
        } else {
            SyncOutcome::UpToDate
        };
        tracing::debug!(path = %decompressed, outcome = outcome.as_str(), "Materialized");

        Ok(SyncResult {
            entry: plan.entry,
            outcome,
            reason: plan.decision.into_reason(),
            compressed: plan.compressed,
            decompressed: Some(decompressed),
            bytes_fetched,
        })
    }
}

impl FetchDecision {
    fn into_reason(self) -> Option<FetchReason> {
        match self {
            FetchDecision::Fetch(reason) => Some(reason),
            FetchDecision::Skip { .. } => None,
        }
    }
}
