//! Error types for seed-remote

use seed_fs::ChecksumAlgorithm;

/// Result type for seed-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the artifact repository
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No artifact with this path is indexed by the repository
    #[error("Artifact not found in repository: {path}")]
    NotFound { path: String },

    /// Credentials were rejected
    #[error("Authentication rejected by {url} (HTTP {status})")]
    Unauthorized { url: String, status: u16 },

    /// Any other non-success HTTP status
    #[error("Unexpected HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Connection, DNS, TLS or mid-stream read failure
    #[error("Transport error contacting {url}: {message}")]
    Transport { url: String, message: String },

    /// The repository answered with something other than the expected JSON
    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// The search result lacks the checksum field being compared on
    #[error("Repository reported no {algorithm} checksum for {path}")]
    MissingChecksum {
        path: String,
        algorithm: ChecksumAlgorithm,
    },

    /// Writing the fetched artifact locally failed
    #[error(transparent)]
    Fs(#[from] seed_fs::Error),
}
