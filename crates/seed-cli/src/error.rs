//! Error types for seed-cli

use seed_core::ErrorKind;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from seed-core
    #[error(transparent)]
    Core(#[from] seed_core::Error),

    /// Writing the report failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serializing the report failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CliError::Core(e) => Some(e.kind()),
            CliError::Io(_) | CliError::Json(_) => None,
        }
    }

    /// Process exit status: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            Some(ErrorKind::Config) => 2,
            _ => 1,
        }
    }
}
