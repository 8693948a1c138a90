//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

use seed_core::Settings;
use seed_fs::ChecksumAlgorithm;

/// Seed a local data folder from an artifact repository
///
/// Every artifact listed in the manifest is fetched as `<path>.gz` when the
/// local copy is missing or its checksum differs from the repository's, then
/// decompressed to `<path>` inside the data folder.
#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Manifest file: a JSON array of {"collection", "path"} records
    #[arg(short, long, env = "SEED_INPUT", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Folder the artifacts are synced into
    #[arg(short, long, env = "SEED_DATA_FOLDER", value_name = "DIR")]
    pub data_folder: Option<PathBuf>,

    /// Base URL of the repository manager
    #[arg(short, long, env = "SEED_URL")]
    pub url: Option<String>,

    /// Name of the repository holding the artifacts
    #[arg(short, long, env = "SEED_REPOSITORY")]
    pub repository: Option<String>,

    /// Repository username
    #[arg(short = 'U', long, env = "SEED_USERNAME")]
    pub username: Option<String>,

    /// Repository password
    #[arg(short = 'P', long, env = "SEED_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Settings file (TOML, JSON or YAML); flags and environment take precedence
    #[arg(short, long, env = "SEED_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Checksum compared against the repository: md5 or sha256
    #[arg(long, value_name = "ALGORITHM")]
    pub checksum: Option<ChecksumAlgorithm>,

    /// HTTP timeout per request, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Report what would be fetched without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings given on the command line or through the environment.
    pub fn settings(&self) -> Settings {
        Settings {
            input: self.input.clone(),
            data_folder: self.data_folder.clone(),
            url: self.url.clone(),
            repository: self.repository.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            checksum: self.checksum,
            timeout_secs: self.timeout,
            ..Settings::default()
        }
    }
}
