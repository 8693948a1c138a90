//! Artifact repository client for data-seed
//!
//! [`RepositoryClient`] is the transport seam used by the sync engine: it
//! reports the checksum the repository holds for an artifact and fetches
//! the artifact's raw bytes. [`NexusClient`] implements it over the Nexus
//! REST API with blocking HTTP.

pub mod client;
pub mod error;
pub mod nexus;

pub use client::RepositoryClient;
pub use error::{Error, Result};
pub use nexus::{Credentials, NexusClient, RemoteConfig};
