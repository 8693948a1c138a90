//! Core orchestration layer for data-seed
//!
//! This crate ties the filesystem layer (`seed-fs`) and the repository
//! client (`seed-remote`) together:
//!
//! - [`Manifest`] parses the ordered list of artifacts to sync
//! - [`SyncEngine`] decides fetch-or-skip for one entry and materializes it
//! - [`Driver`] runs the engine over a whole manifest, failing fast
//! - [`SeedConfig`] is the validated, immutable run configuration

pub mod config;
pub mod error;
pub mod manifest;
pub mod sync;

pub use config::{SeedConfig, Settings};
pub use error::{Error, ErrorKind, Result};
pub use manifest::{Manifest, ManifestEntry};
pub use sync::{
    Driver, FetchDecision, FetchReason, RunReport, SyncEngine, SyncOptions, SyncOutcome,
    SyncPlan, SyncResult,
};
