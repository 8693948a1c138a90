//! In-memory fakes for the repository and the local store.
//!
//! [`FakeWorld`] owns one shared state: the artifacts the "remote" holds,
//! the compressed files "on disk", the decompressed outputs and an ordered
//! log of every call. [`FakeRepository`] and [`FakeStore`] are cheap handles
//! onto that state, so a fetch made through the repository is visible to
//! the store, exactly as it would be on a real filesystem.
//!
//! Checksums are not computed: every blob carries the checksum it should
//! report, which lets tests use literal values such as `"abc123"`.
//!
//! # Example
//!
//! ```rust
//! use seed_fs::{LocalStore, NormalizedPath};
//! use seed_remote::RepositoryClient;
//! use seed_test_utils::fakes::FakeWorld;
//!
//! let world = FakeWorld::new();
//! world.put_remote("users/data.gz", b"payload", "abc123");
//!
//! let repository = world.repository();
//! let store = world.store();
//! let local = NormalizedPath::new("/data/users/data.gz");
//! repository.fetch("users/data.gz", &local).unwrap();
//!
//! assert_eq!(store.checksum(&local).unwrap().hex(), "abc123");
//! assert_eq!(world.fetch_count(), 1);
//! ```

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use seed_fs::archive::decompressed_path;
use seed_fs::{Checksum, ChecksumAlgorithm, LocalStore, NormalizedPath};
use seed_remote::RepositoryClient;

/// One recorded interaction with a fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RemoteChecksum(String),
    Fetch { path: String, destination: String },
    EnsureParent(String),
    LocalChecksum(String),
    Decompress(String),
}

impl Call {
    /// The artifact or file path the call was made with.
    pub fn path(&self) -> &str {
        match self {
            Call::RemoteChecksum(path)
            | Call::EnsureParent(path)
            | Call::LocalChecksum(path)
            | Call::Decompress(path) => path,
            Call::Fetch { path, .. } => path,
        }
    }
}

/// An injected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Remote: artifact not indexed. Local: file missing.
    NotFound,
    /// Remote: connection failure.
    Transport,
    /// Local: the compressed file is not valid gzip.
    Corrupt,
}

#[derive(Debug, Clone)]
struct Blob {
    bytes: Vec<u8>,
    checksum: String,
}

#[derive(Debug, Default)]
struct State {
    remote: HashMap<String, Blob>,
    local: HashMap<String, Blob>,
    decompressed: HashMap<String, Vec<u8>>,
    checksum_failures: HashMap<String, Failure>,
    fetch_failures: HashMap<String, Failure>,
    decompress_failures: HashMap<String, Failure>,
    calls: Vec<Call>,
}

/// Shared state behind [`FakeRepository`] and [`FakeStore`].
#[derive(Debug, Clone, Default)]
pub struct FakeWorld {
    state: Arc<Mutex<State>>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A repository handle onto this world.
    pub fn repository(&self) -> FakeRepository {
        FakeRepository {
            world: self.clone(),
        }
    }

    /// A local store handle onto this world.
    pub fn store(&self) -> FakeStore {
        FakeStore {
            world: self.clone(),
        }
    }

    /// Publish (or replace) an artifact in the fake repository.
    pub fn put_remote(&self, path: &str, bytes: &[u8], checksum: &str) {
        self.lock().remote.insert(
            path.to_string(),
            Blob {
                bytes: bytes.to_vec(),
                checksum: checksum.to_string(),
            },
        );
    }

    /// Place a compressed file in the fake data folder.
    pub fn put_local(&self, path: impl Into<NormalizedPath>, bytes: &[u8], checksum: &str) {
        self.lock().local.insert(
            path.into().as_str().to_string(),
            Blob {
                bytes: bytes.to_vec(),
                checksum: checksum.to_string(),
            },
        );
    }

    /// Make the next and all later checksum queries for `path` fail.
    pub fn fail_checksum(&self, path: &str, failure: Failure) {
        self.lock()
            .checksum_failures
            .insert(path.to_string(), failure);
    }

    /// Make fetches of `path` fail.
    pub fn fail_fetch(&self, path: &str, failure: Failure) {
        self.lock().fetch_failures.insert(path.to_string(), failure);
    }

    /// Make decompression of the local file at `path` fail.
    pub fn fail_decompress(&self, path: impl Into<NormalizedPath>, failure: Failure) {
        self.lock()
            .decompress_failures
            .insert(path.into().as_str().to_string(), failure);
    }

    /// Bytes of the compressed file at `path`, if present.
    pub fn local_bytes(&self, path: impl Into<NormalizedPath>) -> Option<Vec<u8>> {
        self.lock()
            .local
            .get(path.into().as_str())
            .map(|blob| blob.bytes.clone())
    }

    /// Checksum the compressed file at `path` would report, if present.
    pub fn local_checksum(&self, path: impl Into<NormalizedPath>) -> Option<String> {
        self.lock()
            .local
            .get(path.into().as_str())
            .map(|blob| blob.checksum.clone())
    }

    /// Bytes of the decompressed output at `path`, if produced.
    pub fn decompressed_bytes(&self, path: impl Into<NormalizedPath>) -> Option<Vec<u8>> {
        self.lock().decompressed.get(path.into().as_str()).cloned()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn fetch_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Fetch { .. }))
    }

    pub fn remote_checksum_count(&self) -> usize {
        self.count(|call| matches!(call, Call::RemoteChecksum(_)))
    }

    pub fn decompress_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Decompress(_)))
    }

    /// Whether any call was made whose path contains `fragment`.
    pub fn touched(&self, fragment: &str) -> bool {
        self.lock()
            .calls
            .iter()
            .any(|call| call.path().contains(fragment))
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| predicate(call)).count()
    }
}

fn remote_failure(path: &str, failure: Failure) -> seed_remote::Error {
    match failure {
        Failure::NotFound => seed_remote::Error::NotFound {
            path: path.to_string(),
        },
        Failure::Transport | Failure::Corrupt => seed_remote::Error::Transport {
            url: format!("fake://repository/{path}"),
            message: "connection reset by peer".to_string(),
        },
    }
}

fn local_failure(path: &NormalizedPath, failure: Failure) -> seed_fs::Error {
    match failure {
        Failure::Corrupt => seed_fs::Error::CorruptArchive {
            path: path.to_native(),
            message: "invalid gzip header".to_string(),
        },
        Failure::NotFound | Failure::Transport => {
            seed_fs::Error::io(path.to_native(), io::ErrorKind::NotFound.into())
        }
    }
}

/// In-memory [`RepositoryClient`].
#[derive(Debug, Clone)]
pub struct FakeRepository {
    world: FakeWorld,
}

impl RepositoryClient for FakeRepository {
    fn checksum(&self, path: &str) -> seed_remote::Result<Checksum> {
        let mut state = self.world.lock();
        state.calls.push(Call::RemoteChecksum(path.to_string()));

        if let Some(failure) = state.checksum_failures.get(path) {
            return Err(remote_failure(path, *failure));
        }
        state
            .remote
            .get(path)
            .map(|blob| Checksum::new(ChecksumAlgorithm::Md5, &blob.checksum))
            .ok_or_else(|| remote_failure(path, Failure::NotFound))
    }

    fn fetch(&self, path: &str, destination: &NormalizedPath) -> seed_remote::Result<u64> {
        let mut state = self.world.lock();
        state.calls.push(Call::Fetch {
            path: path.to_string(),
            destination: destination.as_str().to_string(),
        });

        if let Some(failure) = state.fetch_failures.get(path) {
            return Err(remote_failure(path, *failure));
        }
        let blob = state
            .remote
            .get(path)
            .cloned()
            .ok_or_else(|| remote_failure(path, Failure::NotFound))?;
        let written = blob.bytes.len() as u64;
        state.local.insert(destination.as_str().to_string(), blob);
        Ok(written)
    }
}

/// In-memory [`LocalStore`].
///
/// Decompression copies the compressed bytes verbatim into the sibling
/// path, which is enough to observe that it ran and on which content.
#[derive(Debug, Clone)]
pub struct FakeStore {
    world: FakeWorld,
}

impl LocalStore for FakeStore {
    fn exists(&self, path: &NormalizedPath) -> bool {
        self.world.lock().local.contains_key(path.as_str())
    }

    fn ensure_parent(&self, path: &NormalizedPath) -> seed_fs::Result<()> {
        self.world
            .lock()
            .calls
            .push(Call::EnsureParent(path.as_str().to_string()));
        Ok(())
    }

    fn checksum(&self, path: &NormalizedPath) -> seed_fs::Result<Checksum> {
        let mut state = self.world.lock();
        state
            .calls
            .push(Call::LocalChecksum(path.as_str().to_string()));
        state
            .local
            .get(path.as_str())
            .map(|blob| Checksum::new(ChecksumAlgorithm::Md5, &blob.checksum))
            .ok_or_else(|| local_failure(path, Failure::NotFound))
    }

    fn decompress(&self, path: &NormalizedPath) -> seed_fs::Result<NormalizedPath> {
        let mut state = self.world.lock();
        state.calls.push(Call::Decompress(path.as_str().to_string()));

        if let Some(failure) = state.decompress_failures.get(path.as_str()) {
            return Err(local_failure(path, *failure));
        }
        let destination = decompressed_path(path)?;
        let bytes = state
            .local
            .get(path.as_str())
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| local_failure(path, Failure::NotFound))?;
        state
            .decompressed
            .insert(destination.as_str().to_string(), bytes);
        Ok(destination)
    }
}
