//! Local artifact store
//!
//! [`LocalStore`] is the seam between the sync engine and the data folder.
//! [`FsStore`] is the real implementation; tests substitute in-memory fakes.

use std::fs;

use crate::archive::{self, decompressed_path};
use crate::checksum::{self, Checksum, ChecksumAlgorithm};
use crate::{Error, NormalizedPath, Result, RobustnessConfig};

/// Local operations the sync engine performs on compressed artifacts.
pub trait LocalStore {
    /// Whether a file exists at `path`.
    fn exists(&self, path: &NormalizedPath) -> bool;

    /// Create the parent directory of `path` (and its ancestors).
    fn ensure_parent(&self, path: &NormalizedPath) -> Result<()>;

    /// Checksum of the compressed file at `path`.
    fn checksum(&self, path: &NormalizedPath) -> Result<Checksum>;

    /// Decompress `path` (ending in `.gz`) into its sibling, overwriting it.
    ///
    /// Returns the path of the decompressed file.
    fn decompress(&self, path: &NormalizedPath) -> Result<NormalizedPath>;
}

/// [`LocalStore`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore {
    algorithm: ChecksumAlgorithm,
    robustness: RobustnessConfig,
}

impl FsStore {
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        Self {
            algorithm,
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }
}

impl LocalStore for FsStore {
    fn exists(&self, path: &NormalizedPath) -> bool {
        path.is_file()
    }

    fn ensure_parent(&self, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        match native.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
            }
            _ => Ok(()),
        }
    }

    fn checksum(&self, path: &NormalizedPath) -> Result<Checksum> {
        let native = path.to_native();
        checksum::compute_file_checksum(self.algorithm, &native).map_err(|e| Error::io(native, e))
    }

    fn decompress(&self, path: &NormalizedPath) -> Result<NormalizedPath> {
        let destination = decompressed_path(path)?;
        archive::gunzip_file(path, &destination, self.robustness)?;
        Ok(destination)
    }
}
