//! Cache entries and the file observations they are built from

use crate::error::{BundleError, BundleResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Last observed state of a single input file
///
/// Persisted as a two element array `[content_hash | null, modified]` so the
/// cache file stays a flat path -> observation mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(Option<String>, u64)", into = "(Option<String>, u64)")]
pub struct CacheEntry {
    /// SHA256 of the file contents, hex encoded. `None` until the file has
    /// been hashed at least once.
    pub content_hash: Option<String>,

    /// Modification time in nanoseconds since the Unix epoch
    pub modified: u64,
}

impl CacheEntry {
    /// Entry for a file seen for the first time
    pub fn unhashed(modified: u64) -> Self {
        Self {
            content_hash: None,
            modified,
        }
    }
}

impl From<(Option<String>, u64)> for CacheEntry {
    fn from((content_hash, modified): (Option<String>, u64)) -> Self {
        Self {
            content_hash,
            modified,
        }
    }
}

impl From<CacheEntry> for (Option<String>, u64) {
    fn from(entry: CacheEntry) -> Self {
        (entry.content_hash, entry.modified)
    }
}

fn stat_error(path: &Path, e: std::io::Error) -> BundleError {
    if e.kind() == ErrorKind::NotFound {
        BundleError::PathNotFound(path.to_path_buf())
    } else {
        BundleError::io(format!("reading metadata of {}", path.display()), e)
    }
}

/// Read a file's modification time in nanoseconds since the Unix epoch
///
/// Times before the epoch collapse to zero.
pub fn modified_nanos(path: &Path) -> BundleResult<u64> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| stat_error(path, e))?;

    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0))
}

/// Hash a file's contents using SHA256, returning the full hex digest
pub fn hash_file(path: &Path) -> BundleResult<String> {
    let contents = fs::read(path).map_err(|e| stat_error(path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(hex::encode(hasher.finalize()))
}
