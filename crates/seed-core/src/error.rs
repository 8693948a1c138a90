//! Error types for seed-core

use std::fmt;
use std::path::PathBuf;

/// Result type for seed-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in seed-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A setting is present but unusable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Required settings were not supplied by any source
    #[error("Missing required settings: {}", .missing.join(", "))]
    MissingSettings { missing: Vec<&'static str> },

    /// The manifest file does not exist
    #[error("Manifest not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// The manifest is not a JSON array of objects
    #[error("Failed to parse manifest {origin}: {message}")]
    ManifestParse { origin: String, message: String },

    /// One manifest record is malformed (1-based index)
    #[error("Invalid manifest entry #{index}: {message}")]
    InvalidEntry { index: usize, message: String },

    /// Syncing one entry failed; the run stopped here
    #[error("Entry #{index} ({path}) failed: {source}")]
    Entry {
        index: usize,
        path: String,
        source: Box<Error>,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from seed-fs
    #[error(transparent)]
    Fs(#[from] seed_fs::Error),

    /// Repository error from seed-remote
    #[error(transparent)]
    Remote(#[from] seed_remote::Error),
}

/// Coarse classification of an [`Error`], used for exit codes and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid settings, or a missing manifest
    Config,
    /// Malformed manifest
    Parse,
    /// Artifact absent from the repository
    NotFound,
    /// Network, HTTP status, authentication or unexpected reply
    Transport,
    /// Local filesystem failure
    Io,
    /// Compressed file is not valid gzip
    CorruptData,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Parse => "parse",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Transport => "transport",
            ErrorKind::Io => "io",
            ErrorKind::CorruptData => "corrupt-data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error. Entry errors report the kind of their cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } | Error::MissingSettings { .. } | Error::ManifestNotFound { .. } => {
                ErrorKind::Config
            }
            Error::ManifestParse { .. } | Error::InvalidEntry { .. } => ErrorKind::Parse,
            Error::Entry { source, .. } => source.kind(),
            Error::Fs(e) => fs_kind(e),
            Error::Remote(e) => remote_kind(e),
        }
    }

    /// 1-based manifest position of the entry that failed, if any.
    pub fn entry_index(&self) -> Option<usize> {
        match self {
            Error::Entry { index, .. } | Error::InvalidEntry { index, .. } => Some(*index),
            _ => None,
        }
    }
}

fn fs_kind(error: &seed_fs::Error) -> ErrorKind {
    use seed_fs::Error as Fs;
    match error {
        Fs::Io { .. } | Fs::LockFailed { .. } | Fs::NotCompressed { .. } => ErrorKind::Io,
        Fs::CorruptArchive { .. } => ErrorKind::CorruptData,
        Fs::ConfigParse { .. } | Fs::UnsupportedFormat { .. } => ErrorKind::Config,
        Fs::InvalidPath { .. } => ErrorKind::Parse,
    }
}

fn remote_kind(error: &seed_remote::Error) -> ErrorKind {
    use seed_remote::Error as Remote;
    match error {
        Remote::NotFound { .. } => ErrorKind::NotFound,
        Remote::Unauthorized { .. }
        | Remote::Status { .. }
        | Remote::Transport { .. }
        | Remote::InvalidResponse { .. }
        | Remote::MissingChecksum { .. } => ErrorKind::Transport,
        Remote::Fs(e) => fs_kind(e),
    }
}
