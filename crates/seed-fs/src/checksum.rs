//! Content checksum utilities
//!
//! A [`Checksum`] pairs a digest algorithm with a lowercase hex digest. The
//! repository reports MD5 by default, so that is the default algorithm;
//! SHA-256 is available for repositories configured to compare on it.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const READ_BUFFER: usize = 64 * 1024;

/// Digest algorithm used to compare local and remote artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    #[default]
    Md5,
    Sha256,
}

impl ChecksumAlgorithm {
    /// Name as used in repository checksum maps (`checksum.md5`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }

    fn hasher(&self) -> Hasher {
        match self {
            Self::Md5 => Hasher::Md5(Md5::new()),
            Self::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(format!(
                "unknown checksum algorithm '{other}' (expected md5 or sha256)"
            )),
        }
    }
}

/// An opaque content digest, comparable by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    algorithm: ChecksumAlgorithm,
    hex: String,
}

impl Checksum {
    /// Wrap a hex digest, normalizing case and surrounding whitespace.
    pub fn new(algorithm: ChecksumAlgorithm, hex: impl AsRef<str>) -> Self {
        Self {
            algorithm,
            hex: hex.as_ref().trim().to_ascii_lowercase(),
        }
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

enum Hasher {
    Md5(Md5),
    Sha256(Sha256),
}

impl Hasher {
    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Md5(h) => h.update(bytes),
            Self::Sha256(h) => h.update(bytes),
        }
    }

    fn finish(self, algorithm: ChecksumAlgorithm) -> Checksum {
        let hex = match self {
            Self::Md5(h) => format!("{:x}", h.finalize()),
            Self::Sha256(h) => format!("{:x}", h.finalize()),
        };
        Checksum { algorithm, hex }
    }
}

/// Compute the checksum of in-memory content.
pub fn compute_content_checksum(algorithm: ChecksumAlgorithm, content: &[u8]) -> Checksum {
    let mut hasher = algorithm.hasher();
    hasher.update(content);
    hasher.finish(algorithm)
}

/// Compute the checksum of everything a reader yields.
pub fn compute_reader_checksum<R: Read>(
    algorithm: ChecksumAlgorithm,
    mut reader: R,
) -> io::Result<Checksum> {
    let mut hasher = algorithm.hasher();
    let mut buf = vec![0u8; READ_BUFFER];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(hasher.finish(algorithm))
}

/// Compute the checksum of a file's contents without loading it whole.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_file_checksum(algorithm: ChecksumAlgorithm, path: &Path) -> io::Result<Checksum> {
    let file = File::open(path)?;
    compute_reader_checksum(algorithm, file)
}
