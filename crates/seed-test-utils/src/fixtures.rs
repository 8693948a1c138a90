//! On-disk fixtures: gzip payloads, manifests and data folders.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use seed_fs::NormalizedPath;
use tempfile::TempDir;

/// Gzip `content` in memory.
pub fn gzip(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

/// Render a manifest from `(collection, path)` pairs.
pub fn manifest_json(entries: &[(&str, &str)]) -> String {
    let records: Vec<serde_json::Value> = entries
        .iter()
        .map(|(collection, path)| serde_json::json!({ "collection": collection, "path": path }))
        .collect();
    serde_json::to_string_pretty(&records).unwrap()
}

/// A temporary working directory holding a manifest and a data folder.
///
/// The data folder lives at `<root>/data` and is not created up front, so
/// tests can check that syncing creates it.
pub struct TestDataDir {
    temp_dir: TempDir,
}

impl Default for TestDataDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDataDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The data folder artifacts are synced into.
    pub fn data_folder(&self) -> NormalizedPath {
        NormalizedPath::new(self.root().join("data"))
    }

    /// Path of a file relative to the data folder.
    pub fn data_path(&self, relative: &str) -> PathBuf {
        self.data_folder().join(relative).to_native()
    }

    /// Write `manifest.json` at the root and return its path.
    pub fn write_manifest(&self, entries: &[(&str, &str)]) -> PathBuf {
        self.write_file("manifest.json", manifest_json(entries).as_bytes())
    }

    /// Write a file relative to the root, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a file relative to the data folder.
    pub fn write_data(&self, relative: &str, content: &[u8]) -> PathBuf {
        self.write_file(&format!("data/{relative}"), content)
    }

    /// Read a file relative to the data folder.
    pub fn read_data(&self, relative: &str) -> Vec<u8> {
        let path = self.data_path(relative);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
    }

    pub fn assert_data_exists(&self, relative: &str) {
        let path = self.data_path(relative);
        assert!(path.is_file(), "expected {} to exist", path.display());
    }

    pub fn assert_data_missing(&self, relative: &str) {
        let path = self.data_path(relative);
        assert!(!path.exists(), "expected {} to be absent", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn gzip_round_trips_through_decoder() {
        let compressed = gzip(b"seed rows");
        let mut decoded = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "seed rows");
    }

    #[test]
    fn manifest_json_keeps_order() {
        let json = manifest_json(&[("users", "users/data"), ("orders", "orders/data")]);
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["path"], "users/data");
        assert_eq!(parsed[1]["collection"], "orders");
    }

    #[test]
    fn data_folder_is_created_lazily() {
        let dir = TestDataDir::new();
        assert!(!dir.data_folder().exists());
        dir.write_data("a/b.gz", b"x");
        dir.assert_data_exists("a/b.gz");
    }
}
