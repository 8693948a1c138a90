//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Provides consistent path handling across platforms by normalizing
/// all paths to forward slashes internally and converting to
/// platform-native format only at I/O boundaries. `.` segments are
/// dropped and `..` segments are resolved lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: clean(&path.as_ref().to_string_lossy()),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment, resolving dot segments.
    pub fn join(&self, segment: &str) -> Self {
        let segment = clean(segment);
        if segment.is_empty() || segment == "." {
            return self.clone();
        }
        if self.inner.is_empty() || self.inner == "." {
            return Self { inner: segment };
        }
        Self {
            inner: clean(&format!("{}/{}", self.inner, segment)),
        }
    }

    /// Append a suffix to the final component (`data/users` + `.gz`).
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self {
            inner: format!("{}{}", self.inner, suffix),
        }
    }

    /// Remove a suffix from the final component, if present and non-empty.
    pub fn strip_suffix(&self, suffix: &str) -> Option<Self> {
        let stripped = self.inner.strip_suffix(suffix)?;
        if stripped.is_empty() || stripped.ends_with('/') {
            return None;
        }
        Some(Self {
            inner: stripped.to_string(),
        })
    }

    /// Check whether this path lies inside `base` (component-wise).
    pub fn starts_with(&self, base: &NormalizedPath) -> bool {
        if base.inner.is_empty() || base.inner == "." {
            return !self.inner.starts_with('/') && !self.inner.starts_with("..");
        }
        match self.inner.strip_prefix(base.inner.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with('/') || base.inner.ends_with('/'),
            None => false,
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Resolve to an absolute path without UNC prefixes on Windows.
    ///
    /// The path must exist.
    pub fn canonicalize(&self) -> Result<Self> {
        let native = self.to_native();
        dunce::canonicalize(&native)
            .map(Self::new)
            .map_err(|e| Error::io(native, e))
    }
}

/// Validate a repository-relative artifact path taken from a manifest.
///
/// The path must be non-empty, relative, free of `..` segments and must
/// name a file, so that joining it onto the data folder never escapes it.
/// It must also already be in clean `/`-separated form: the same string
/// addresses the artifact in the repository and on disk.
pub fn validate_artifact_path(raw: &str) -> Result<()> {
    let reason = if raw.trim().is_empty() {
        Some("path is empty")
    } else if raw.starts_with('/') || raw.starts_with('\\') || has_drive_prefix(raw) {
        Some("path must be relative")
    } else if raw.split(['/', '\\']).any(|segment| segment == "..") {
        Some("path must not contain '..' segments")
    } else if raw.ends_with('/') || raw.ends_with('\\') || clean(raw) == "." {
        Some("path must name a file")
    } else if raw.contains('\\') {
        Some("path must use '/' separators")
    } else if raw.split('/').any(|segment| segment.is_empty() || segment == ".") {
        Some("path must not contain '.' or empty segments")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn has_drive_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn clean(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let (prefix, rest) = if unified.starts_with("//") && !unified.starts_with("///") {
        ("//", &unified[2..])
    } else if unified.starts_with('/') {
        ("/", unified.trim_start_matches('/'))
    } else {
        ("", unified.as_str())
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in rest.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if prefix.is_empty() {
                    parts.push("..");
                }
                // `..` above the root of an absolute path stays at the root
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if prefix.is_empty() && body.is_empty() {
        if unified.is_empty() {
            String::new()
        } else {
            ".".to_string()
        }
    } else {
        format!("{prefix}{body}")
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Serialize for NormalizedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for NormalizedPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_duplicate_separators() {
        assert_eq!(clean("a//b///c"), "a/b/c");
    }

    #[test]
    fn clean_keeps_leading_parent_segments_of_relative_paths() {
        assert_eq!(clean("../a/../../b"), "../../b");
    }

    #[test]
    fn clean_keeps_network_prefix() {
        assert_eq!(clean("//server/share/./x"), "//server/share/x");
    }

    #[test]
    fn clean_of_dot_only_path_is_dot() {
        assert_eq!(clean("./."), ".");
        assert_eq!(clean(""), "");
    }
}
