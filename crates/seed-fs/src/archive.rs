//! Gzip materialization of compressed artifacts
//!
//! A compressed artifact `<path>.gz` decompresses into its sibling `<path>`.
//! The output is always rewritten in full; an existing decompressed file is
//! never trusted.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::io::write_atomic_with;
use crate::{Error, NormalizedPath, Result, RobustnessConfig};

/// Suffix carried by every compressed artifact.
pub const GZIP_SUFFIX: &str = ".gz";

const COPY_BUFFER: usize = 64 * 1024;

/// Path of the decompressed sibling of a compressed artifact.
pub fn decompressed_path(compressed: &NormalizedPath) -> Result<NormalizedPath> {
    compressed
        .strip_suffix(GZIP_SUFFIX)
        .ok_or_else(|| Error::NotCompressed {
            path: compressed.to_native(),
        })
}

/// Decompress `source` into `destination`, replacing it atomically.
///
/// Returns the number of decompressed bytes written.
///
/// # Errors
///
/// - [`Error::Io`] if `source` is missing or unreadable, or the output
///   cannot be written.
/// - [`Error::CorruptArchive`] if `source` is empty or not valid gzip.
pub fn gunzip_file(
    source: &NormalizedPath,
    destination: &NormalizedPath,
    config: RobustnessConfig,
) -> Result<u64> {
    let source_path = source.to_native();
    let metadata = fs::metadata(&source_path).map_err(|e| Error::io(&source_path, e))?;
    if metadata.len() == 0 {
        return Err(Error::CorruptArchive {
            path: source_path,
            message: "file is empty".to_string(),
        });
    }

    let input = File::open(&source_path).map_err(|e| Error::io(&source_path, e))?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));
    let destination_path = destination.to_native();

    let written = write_atomic_with(destination, config, |out| {
        let mut buf = vec![0u8; COPY_BUFFER];
        let mut total = 0u64;
        loop {
            let n = match decoder.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(classify_read_error(&source_path, e)),
            };
            out.write_all(&buf[..n])
                .map_err(|e| Error::io(&destination_path, e))?;
            total += n as u64;
        }
        Ok(total)
    })?;

    tracing::debug!(source = %source, destination = %destination, bytes = written, "Decompressed artifact");
    Ok(written)
}

fn classify_read_error(path: &Path, error: io::Error) -> Error {
    match error.kind() {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
            Error::CorruptArchive {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        }
        _ => Error::io(path, error),
    }
}
