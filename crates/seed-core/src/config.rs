//! Run configuration
//!
//! Settings arrive from up to three sources: an optional settings file
//! (TOML, JSON or YAML), environment variables and command-line flags. Each
//! source is a partial [`Settings`]; later sources override earlier ones via
//! [`Settings::merge`], and [`Settings::resolve`] validates the result into
//! an immutable [`SeedConfig`].

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use seed_fs::{ChecksumAlgorithm, ConfigStore, NormalizedPath, RobustnessConfig};
use seed_remote::{Credentials, RemoteConfig};

use crate::{Error, Result};

/// Partial settings from one source. Every field is optional.
#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Manifest file
    pub input: Option<PathBuf>,
    pub data_folder: Option<PathBuf>,
    /// Repository manager base URL
    pub url: Option<String>,
    /// Repository name
    pub repository: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub checksum: Option<ChecksumAlgorithm>,
    /// Overall HTTP timeout per request
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    /// How long to wait for a file lock
    pub lock_timeout_secs: Option<u64>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("input", &self.input)
            .field("data_folder", &self.data_folder)
            .field("url", &self.url)
            .field("repository", &self.repository)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("checksum", &self.checksum)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("lock_timeout_secs", &self.lock_timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Load a settings file; the format follows the extension.
    ///
    /// # Errors
    ///
    /// A missing or unreadable file, an unsupported extension, malformed
    /// content or an unknown key are all configuration errors.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Config {
                message: format!("settings file not found: {path}"),
            });
        }
        let settings: Settings = ConfigStore::new().load(path).map_err(|e| match e {
            seed_fs::Error::Io { source, .. } => Error::Config {
                message: format!("cannot read settings file {path}: {source}"),
            },
            other => other.into(),
        })?;
        tracing::debug!(path = %path, "Loaded settings file");
        Ok(settings)
    }

    /// Override fields of `self` with the fields set in `other`.
    pub fn merge(&mut self, other: Settings) {
        fn take<T>(base: &mut Option<T>, other: Option<T>) {
            if other.is_some() {
                *base = other;
            }
        }

        take(&mut self.input, other.input);
        take(&mut self.data_folder, other.data_folder);
        take(&mut self.url, other.url);
        take(&mut self.repository, other.repository);
        take(&mut self.username, other.username);
        take(&mut self.password, other.password);
        take(&mut self.checksum, other.checksum);
        take(&mut self.timeout_secs, other.timeout_secs);
        take(&mut self.connect_timeout_secs, other.connect_timeout_secs);
        take(&mut self.lock_timeout_secs, other.lock_timeout_secs);
    }

    /// Validate into a [`SeedConfig`].
    ///
    /// # Errors
    ///
    /// - [`Error::MissingSettings`] naming every absent required setting
    /// - [`Error::ManifestNotFound`] if the manifest file does not exist
    /// - [`Error::Config`] for a non-http(s) URL, a data folder that is a
    ///   file, or a zero timeout
    pub fn resolve(self) -> Result<SeedConfig> {
        let mut missing = Vec::new();
        let input = required(self.input.filter(|p| !p.as_os_str().is_empty()), "input", &mut missing);
        let data_folder = required(
            self.data_folder.filter(|p| !p.as_os_str().is_empty()),
            "data-folder",
            &mut missing,
        );
        let url = required(non_blank(self.url), "url", &mut missing);
        let repository = required(non_blank(self.repository), "repository", &mut missing);
        let username = required(non_blank(self.username), "username", &mut missing);
        let password = required(self.password.filter(|p| !p.is_empty()), "password", &mut missing);

        let (Some(input), Some(data_folder), Some(url), Some(repository), Some(username), Some(password)) =
            (input, data_folder, url, repository, username, password)
        else {
            return Err(Error::MissingSettings { missing });
        };

        let url = url.trim().to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config {
                message: format!("url must start with http:// or https://, got '{url}'"),
            });
        }

        let manifest = NormalizedPath::new(&input);
        if !manifest.is_file() {
            return Err(Error::ManifestNotFound { path: input });
        }

        let data_folder = NormalizedPath::new(&data_folder);
        if data_folder.exists() && !data_folder.is_dir() {
            return Err(Error::Config {
                message: format!("data folder is not a directory: {data_folder}"),
            });
        }

        let timeout = positive_secs(
            self.timeout_secs,
            RemoteConfig::DEFAULT_TIMEOUT_SECS,
            "timeout_secs",
        )?;
        let connect_timeout = positive_secs(
            self.connect_timeout_secs,
            RemoteConfig::DEFAULT_CONNECT_TIMEOUT_SECS,
            "connect_timeout_secs",
        )?;
        let default_lock = RobustnessConfig::default().lock_timeout.as_secs();
        let lock_timeout = positive_secs(self.lock_timeout_secs, default_lock, "lock_timeout_secs")?;

        let remote = RemoteConfig::new(url, repository.trim())
            .with_credentials(Credentials::new(username.trim(), password))
            .with_algorithm(self.checksum.unwrap_or_default())
            .with_timeouts(timeout, connect_timeout);
        let robustness = RobustnessConfig {
            lock_timeout,
            ..RobustnessConfig::default()
        };

        Ok(SeedConfig {
            manifest,
            data_folder,
            remote,
            robustness,
        })
    }
}

fn required<T>(value: Option<T>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn positive_secs(value: Option<u64>, default: u64, name: &str) -> Result<Duration> {
    match value.unwrap_or(default) {
        0 => Err(Error::Config {
            message: format!("{name} must be greater than zero"),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    /// Manifest file listing the artifacts
    pub manifest: NormalizedPath,
    /// Root of the local artifact layout
    pub data_folder: NormalizedPath,
    pub remote: RemoteConfig,
    pub robustness: RobustnessConfig,
}

impl SeedConfig {
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.remote.algorithm
    }
}
