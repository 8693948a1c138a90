//! Manifest parsing
//!
//! A manifest is a JSON array of records, each naming one artifact:
//!
//! ```json
//! [
//!   { "collection": "users", "path": "users/data" },
//!   { "collection": "orders", "path": "orders/2024/data" }
//! ]
//! ```
//!
//! `path` is relative to both the repository and the data folder and carries
//! no compression suffix. `collection` is informational only. The whole
//! manifest is parsed and validated before any entry is synced.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use seed_fs::archive::GZIP_SUFFIX;
use seed_fs::{NormalizedPath, io, validate_artifact_path};

use crate::{Error, Result};

/// One artifact named by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Logical group the artifact belongs to; carried through for logging
    #[serde(default)]
    pub collection: String,
    /// Artifact path without the `.gz` suffix
    pub path: String,
}

impl ManifestEntry {
    pub fn new(collection: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            path: path.into(),
        }
    }

    /// Path of the compressed artifact in the repository.
    pub fn remote_path(&self) -> String {
        format!("{}{}", self.path, GZIP_SUFFIX)
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.collection.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{} ({})", self.path, self.collection)
        }
    }
}

/// Ordered, validated list of manifest entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Build a manifest from entries without validating them.
    pub fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// - [`Error::ManifestNotFound`] if `path` is not a file
    /// - [`Error::ManifestParse`] / [`Error::InvalidEntry`] on malformed content
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestNotFound {
                path: path.to_native(),
            });
        }
        let content = io::read_text(path)?;
        let manifest = parse_manifest(&content, path.as_str())?;
        tracing::debug!(path = %path, entries = manifest.len(), "Loaded manifest");
        Ok(manifest)
    }

    /// Parse manifest content.
    pub fn parse(content: &str) -> Result<Self> {
        parse_manifest(content, "<inline>")
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn parse_manifest(content: &str, origin: &str) -> Result<Manifest> {
    let value: Value = serde_json::from_str(content).map_err(|e| Error::ManifestParse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;

    let Value::Array(records) = value else {
        return Err(Error::ManifestParse {
            origin: origin.to_string(),
            message: format!("expected a JSON array of entries, found {}", json_type(&value)),
        });
    };

    let mut entries = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();
    for (i, record) in records.into_iter().enumerate() {
        let index = i + 1;
        if !record.is_object() {
            return Err(Error::InvalidEntry {
                index,
                message: format!("expected an object, found {}", json_type(&record)),
            });
        }

        let entry: ManifestEntry = serde_json::from_value(record).map_err(|e| Error::InvalidEntry {
            index,
            message: e.to_string(),
        })?;
        validate_artifact_path(&entry.path).map_err(|e| Error::InvalidEntry {
            index,
            message: e.to_string(),
        })?;

        if !seen.insert(entry.path.clone()) {
            tracing::warn!(index, path = %entry.path, "Duplicate manifest path");
        }
        entries.push(entry);
    }

    Ok(Manifest { entries })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
