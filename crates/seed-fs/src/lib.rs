//! Filesystem layer for data-seed
//!
//! Provides normalized path handling, lock-guarded atomic writes, content
//! checksums, gzip materialization and the [`LocalStore`] seam used by the
//! sync engine.

pub mod archive;
pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod store;

pub use checksum::{Checksum, ChecksumAlgorithm};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, validate_artifact_path};
pub use store::{FsStore, LocalStore};
