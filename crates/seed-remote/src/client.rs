//! The repository transport seam

use seed_fs::{Checksum, NormalizedPath};

use crate::Result;

/// Remote operations the sync engine needs from an artifact repository.
///
/// Paths are repository-relative and include the compression suffix
/// (`users/data.gz`). Implementations do no caching.
pub trait RepositoryClient {
    /// Checksum the repository reports for `path`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if nothing is indexed
    /// under `path`; a transport-class error if the query itself fails.
    fn checksum(&self, path: &str) -> Result<Checksum>;

    /// Download `path` into `destination`, replacing its contents entirely.
    ///
    /// Returns the number of bytes written.
    fn fetch(&self, path: &str, destination: &NormalizedPath) -> Result<u64>;
}
