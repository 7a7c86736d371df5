//! Two-tier (timestamp, then content hash) change detection ledger

use crate::cache::entry::{hash_file, modified_nanos, CacheEntry};
use crate::error::{BundleError, BundleResult};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Cache file name, placed in the output directory
pub const CACHE_FILE_NAME: &str = "bundle.cache.json";

/// Counters describing the work the cache saved or caused during a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Checks that reported the file unchanged
    pub clean: usize,
    /// Checks that reported the file changed or new
    pub dirty: usize,
    /// Content hashes computed
    pub hashed: usize,
}

/// Persistent per-path change-detection ledger
///
/// Single writer only. Entries for inputs that disappear from the manifest
/// are kept; they are inert.
///
/// Paths under the input root are keyed relative to it, so the same tree
/// driven through a relative or an absolute input directory shares entries.
/// Anything outside the root is keyed by the path as given.
#[derive(Debug)]
pub struct ContentCache {
    path: PathBuf,
    root: Option<PathBuf>,
    entries: BTreeMap<String, CacheEntry>,
    /// Verdicts already handed out during this run, not persisted
    verdicts: HashMap<String, bool>,
    changed: bool,
    stats: CacheStats,
}

impl ContentCache {
    /// Load the cache persisted at `path`, or start empty if there is none
    ///
    /// A file that exists but cannot be parsed is a fatal configuration error.
    pub fn load(path: &Path) -> BundleResult<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                BundleError::io(format!("reading build cache {}", path.display()), e)
            })?;
            serde_json::from_str(&content).map_err(|e| BundleError::CacheCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            debug!("No build cache at {}, starting fresh", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            root: None,
            entries,
            verdicts: HashMap::new(),
            changed: false,
            stats: CacheStats::default(),
        })
    }

    /// Load the cache belonging to an output directory
    pub fn load_for_output_dir(output_dir: &Path) -> BundleResult<Self> {
        Self::load(&output_dir.join(CACHE_FILE_NAME))
    }

    /// Key paths under `root` relative to it
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Check whether `path` changed since it was last observed
    ///
    /// The first check of a path in a run decides its verdict; later checks
    /// in the same run return that verdict, so every item sharing an input
    /// sees the change. The stored timestamp is advanced before the content
    /// is hashed, so an interrupted check still moves the baseline forward.
    pub fn is_dirty(&mut self, path: &Path) -> BundleResult<bool> {
        let key = self.key(path);
        if let Some(dirty) = self.verdicts.get(&key) {
            trace!("{} already checked this run", key);
            return Ok(*dirty);
        }

        let dirty = self.observe(&key, path)?;
        self.verdicts.insert(key, dirty);
        Ok(dirty)
    }

    fn observe(&mut self, key: &str, path: &Path) -> BundleResult<bool> {
        let modified = modified_nanos(path)?;

        let Some(entry) = self.entries.get_mut(key) else {
            trace!("{} is new", key);
            self.entries
                .insert(key.to_string(), CacheEntry::unhashed(modified));
            self.changed = true;
            self.stats.dirty += 1;
            return Ok(true);
        };

        if entry.modified == modified {
            self.stats.clean += 1;
            return Ok(false);
        }

        entry.modified = modified;
        self.changed = true;

        let current = hash_file(path)?;
        self.stats.hashed += 1;

        if entry.content_hash.as_deref() == Some(current.as_str()) {
            trace!("{} touched but unchanged", key);
            self.stats.clean += 1;
            return Ok(false);
        }

        trace!("{} changed", key);
        entry.content_hash = Some(current);
        self.stats.dirty += 1;
        Ok(true)
    }

    /// Check a set of files, returning true if any of them changed
    ///
    /// Every path is checked so that all of their entries advance together.
    pub fn any_dirty<P: AsRef<Path>>(&mut self, paths: &[P]) -> BundleResult<bool> {
        let mut dirty = false;
        for path in paths {
            dirty |= self.is_dirty(path.as_ref())?;
        }
        Ok(dirty)
    }

    /// Write the cache back to disk
    ///
    /// Does nothing when no entry changed since the last load or flush, so it
    /// is safe to call on every exit path.
    pub fn flush(&mut self) -> BundleResult<()> {
        if !self.changed {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    BundleError::io(format!("creating cache directory {}", parent.display()), e)
                })?;
            }
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content).map_err(|e| {
            BundleError::io(format!("writing build cache {}", self.path.display()), e)
        })?;

        debug!(
            "Flushed {} cache entries to {}",
            self.entries.len(),
            self.path.display()
        );
        self.changed = false;
        Ok(())
    }

    /// Stored entry for a path, if it has ever been observed
    pub fn entry(&self, path: &Path) -> Option<&CacheEntry> {
        self.entries.get(&self.key(path))
    }

    /// Number of tracked paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no path is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Work counters for this run
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn key(&self, path: &Path) -> String {
        let relative = self
            .root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        relative.to_string_lossy().into_owned()
    }
}
