//! Sequential run over a manifest

use chrono::Utc;

use super::engine::SyncEngine;
use super::report::{RunReport, SyncOutcome};
use crate::{Error, Manifest, Result};

/// Runs a [`SyncEngine`] over every manifest entry, in order.
///
/// The first failing entry aborts the run: later entries are never
/// touched and no partial report is produced.
pub struct Driver {
    engine: SyncEngine,
}

impl Driver {
    pub fn new(engine: SyncEngine) -> Self {
        Self { engine }
    }

    /// Sync every entry of `manifest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Entry`] wrapping the cause, with the 1-based
    /// position and path of the entry that failed.
    pub fn run(&self, manifest: &Manifest) -> Result<RunReport> {
        let started_at = Utc::now();
        let total = manifest.len();
        let dry_run = self.engine.options().dry_run;
        tracing::info!(
            entries = total,
            data_folder = %self.engine.data_folder(),
            dry_run,
            "Starting sync"
        );

        let mut results = Vec::with_capacity(total);
        for (i, entry) in manifest.iter().enumerate() {
            let index = i + 1;
            let result = self.engine.sync(entry).map_err(|source| Error::Entry {
                index,
                path: entry.path.clone(),
                source: Box::new(source),
            })?;

            match &result.outcome {
                SyncOutcome::Downloaded => tracing::info!(
                    "[{index}/{total}] {entry}: downloaded {} bytes",
                    result.bytes_fetched.unwrap_or_default()
                ),
                outcome => tracing::info!("[{index}/{total}] {entry}: {}", outcome.as_str()),
            }
            results.push(result);
        }

        let report = RunReport {
            started_at,
            finished_at: Utc::now(),
            dry_run,
            results,
        };
        tracing::info!(
            downloaded = report.downloaded(),
            up_to_date = report.up_to_date(),
            "Sync complete"
        );
        Ok(report)
    }
}
