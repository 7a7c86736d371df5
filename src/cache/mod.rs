//! Persistent change-detection cache for build inputs
//!
//! Tracks every input file the bundle build reads, keyed by path, so that
//! expensive external tool invocations can be skipped when nothing changed.
//!
//! # Change Detection
//!
//! | Stored entry | mtime | Content hash | Verdict |
//! |--------------|-------|--------------|---------|
//! | none | - | not computed | dirty |
//! | present | equal | not computed | clean |
//! | present, no hash | changed | computed, stored | dirty |
//! | present, hash | changed | equal | clean |
//! | present, hash | changed | differs, stored | dirty |
//!
//! The cache is loaded once at the start of a run and flushed on every
//! terminal path, success or failure.

pub mod content;
pub mod entry;

pub use content::{CacheStats, ContentCache, CACHE_FILE_NAME};
pub use entry::{hash_file, modified_nanos, CacheEntry};
