//! Atomic I/O operations with file locking

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Settings controlling how hard atomic writes try before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobustnessConfig {
    /// Maximum time to wait for the sidecar lock of the target file.
    pub lock_timeout: Duration,
    /// Flush file contents to disk before the rename.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(10),
            enable_fsync: true,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();
    write_atomic_with(path, config, |file| {
        file.write_all(content)
            .map_err(|e| Error::io(&native_path, e))
    })
}

/// Produce a file atomically from a writer callback.
///
/// Parent directories are created as needed and an advisory lock on
/// `<path>.lock` is held for the duration. `fill` writes into a temp file
/// in the destination directory; only when it succeeds is the temp file
/// renamed over `path`. On any error the temp file is removed and the
/// previous content of `path` is left untouched.
pub fn write_atomic_with<T, E, F>(
    path: &NormalizedPath,
    config: RobustnessConfig,
    fill: F,
) -> std::result::Result<T, E>
where
    F: FnOnce(&mut File) -> std::result::Result<T, E>,
    E: From<Error>,
{
    let native_path = path.to_native();
    let parent = parent_dir(&native_path);
    fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

    let _lock = FileLock::acquire(&native_path, config.lock_timeout)?;

    let prefix = format!(
        ".{}.",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    );
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| Error::io(&parent, e))?;

    let value = fill(temp.as_file_mut())?;

    if config.enable_fsync {
        temp.as_file()
            .sync_all()
            .map_err(|e| Error::io(temp.path(), e))?;
    }

    temp.persist(&native_path)
        .map_err(|e| Error::io(&native_path, e.error))?;

    tracing::debug!(path = %path, "Atomic write complete");
    Ok(value)
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Path of the sidecar lock file guarding `target`.
pub fn lock_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Exclusive advisory lock on a sidecar file, released on drop.
///
/// The sidecar is never removed: unlinking it while another writer waits on
/// the old inode would let a third writer lock a fresh file concurrently.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(target: &Path, timeout: Duration) -> Result<Self> {
        let path = lock_path(target);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(10))
            .with_max_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(timeout))
            .build();

        let contended = fs2::lock_contended_error().kind();
        backoff::retry(policy, || {
            file.try_lock_exclusive().map_err(|e| {
                if e.kind() == contended {
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .map_err(|_| Error::LockFailed {
            path: target.to_path_buf(),
        })?;

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(error = %e, "Could not release lock file");
        }
    }
}
