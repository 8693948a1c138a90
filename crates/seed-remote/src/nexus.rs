//! Nexus repository client
//!
//! Talks to two endpoints of a Nexus 3 repository manager:
//!
//! - `GET {base}/service/rest/v1/search?repository={repo}&name={path}` to
//!   read the checksum of an indexed asset
//!   (`items[0].assets[0].checksum.<algorithm>`)
//! - `GET {base}/repository/{repo}/{path}` to download raw bytes
//!
//! Both use HTTP basic auth when credentials are configured.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

use base64::Engine;
use serde::Deserialize;

use seed_fs::io::write_atomic_with;
use seed_fs::{Checksum, ChecksumAlgorithm, NormalizedPath, RobustnessConfig};

use crate::{Error, RepositoryClient, Result};

const COPY_BUFFER: usize = 64 * 1024;

/// Basic-auth credentials. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn header_value(&self) -> String {
        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection settings for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL of the repository manager, e.g. `https://nexus.example.com`
    pub base_url: String,
    /// Name of the repository holding the artifacts
    pub repository: String,
    pub credentials: Option<Credentials>,
    /// Which checksum field of the search result to read
    pub algorithm: ChecksumAlgorithm,
    /// Overall per-request timeout, including the body of a download
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl RemoteConfig {
    /// Default overall timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 600;
    /// Default connect timeout in seconds.
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    pub fn new(base_url: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            repository: repository.into(),
            credentials: None,
            algorithm: ChecksumAlgorithm::default(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_algorithm(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }
}

/// Response from `/service/rest/v1/search`
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    assets: Vec<SearchAsset>,
}

#[derive(Debug, Deserialize)]
struct SearchAsset {
    #[serde(default)]
    checksum: HashMap<String, String>,
}

/// Blocking [`RepositoryClient`] for Nexus repositories.
#[derive(Debug, Clone)]
pub struct NexusClient {
    config: RemoteConfig,
    agent: ureq::Agent,
    authorization: Option<String>,
    robustness: RobustnessConfig,
}

impl NexusClient {
    pub fn new(config: RemoteConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .timeout_connect(config.connect_timeout)
            .user_agent(concat!("data-seed/", env!("CARGO_PKG_VERSION")))
            .build();
        let authorization = config.credentials.as_ref().map(Credentials::header_value);

        Self {
            config,
            agent,
            authorization,
            robustness: RobustnessConfig::default(),
        }
    }

    /// Use custom locking/fsync settings for downloaded files.
    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// URL of the search endpoint (without query string).
    pub fn search_url(&self) -> String {
        format!("{}/service/rest/v1/search", self.base_url())
    }

    /// URL an artifact is downloaded from.
    pub fn artifact_url(&self, path: &str) -> String {
        format!(
            "{}/repository/{}/{}",
            self.base_url(),
            self.config.repository,
            path.trim_start_matches('/')
        )
    }

    fn get(&self, url: &str) -> ureq::Request {
        let request = self.agent.get(url);
        match &self.authorization {
            Some(value) => request.set("Authorization", value),
            None => request,
        }
    }

    fn send(&self, request: ureq::Request, url: &str) -> Result<ureq::Response> {
        match request.call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status @ (401 | 403), _)) => Err(Error::Unauthorized {
                url: url.to_string(),
                status,
            }),
            Err(ureq::Error::Status(status, _)) => Err(Error::Status {
                url: url.to_string(),
                status,
            }),
            Err(ureq::Error::Transport(transport)) => Err(Error::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }
}

impl RepositoryClient for NexusClient {
    fn checksum(&self, path: &str) -> Result<Checksum> {
        let url = self.search_url();
        let algorithm = self.config.algorithm;
        tracing::debug!(%url, repository = %self.config.repository, %path, "Querying remote checksum");

        let request = self
            .get(&url)
            .query("repository", &self.config.repository)
            .query("name", path);
        let response: SearchResponse = self
            .send(request, &url)?
            .into_json()
            .map_err(|e| Error::InvalidResponse {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let asset = response
            .items
            .into_iter()
            .next()
            .and_then(|item| item.assets.into_iter().next())
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })?;

        let hex = asset
            .checksum
            .get(algorithm.as_str())
            .filter(|hex| !hex.trim().is_empty())
            .ok_or_else(|| Error::MissingChecksum {
                path: path.to_string(),
                algorithm,
            })?;

        Ok(Checksum::new(algorithm, hex))
    }

    fn fetch(&self, path: &str, destination: &NormalizedPath) -> Result<u64> {
        let url = self.artifact_url(path);
        tracing::debug!(%url, destination = %destination, "Fetching artifact");

        let response = match self.send(self.get(&url), &url) {
            Err(Error::Status { status: 404, .. }) => {
                return Err(Error::NotFound {
                    path: path.to_string(),
                });
            }
            other => other?,
        };
        let expected_len = response
            .header("Content-Length")
            .and_then(|value| value.parse::<u64>().ok());
        let mut body = response.into_reader();
        let destination_path = destination.to_native();

        let written = write_atomic_with(destination, self.robustness, |out| {
            let mut buf = vec![0u8; COPY_BUFFER];
            let mut total = 0u64;
            loop {
                let n = match body.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        return Err(Error::Transport {
                            url: url.clone(),
                            message: e.to_string(),
                        });
                    }
                };
                out.write_all(&buf[..n])
                    .map_err(|e| seed_fs::Error::io(&destination_path, e))?;
                total += n as u64;
            }

            if let Some(expected) = expected_len
                && expected != total
            {
                return Err(Error::Transport {
                    url: url.clone(),
                    message: format!("connection closed after {total} of {expected} bytes"),
                });
            }
            Ok(total)
        })?;

        tracing::debug!(%url, bytes = written, "Fetched artifact");
        Ok(written)
    }
}
