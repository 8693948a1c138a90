//! Shared test utilities for the data-seed workspace.
//!
//! This crate is a dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`fakes`]: in-memory [`RepositoryClient`](seed_remote::RepositoryClient)
//!   and [`LocalStore`](seed_fs::LocalStore) sharing one recorded state
//! - [`fixtures`]: gzip payloads, manifests and data folders on disk

pub mod fakes;
pub mod fixtures;
