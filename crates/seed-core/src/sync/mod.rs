//! Artifact synchronization
//!
//! This module provides:
//! - **engine**: per-entry fetch-or-skip decision and materialization
//! - **report**: outcome types for one entry and for a whole run
//! - **driver**: sequential, fail-fast run over a manifest

mod driver;
mod engine;
mod report;

pub use driver::Driver;
pub use engine::{FetchDecision, SyncEngine, SyncOptions, SyncPlan};
pub use report::{FetchReason, RunReport, SyncOutcome, SyncResult};
