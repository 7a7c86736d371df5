//! Redistributable runtime files shipped next to the bundle

use crate::bundle::layout::{copy_into, create_dir};
use crate::config::RedistConfig;
use crate::depfile::DependencyRecord;
use crate::error::BundleResult;
use std::path::Path;
use tracing::debug;

/// Copy the configured redistributables into `redist_dir`
///
/// Debug-only files are included when `debug` is set. Returns the number of
/// files copied.
pub fn copy_redist(
    entries: &[RedistConfig],
    redist_dir: &Path,
    debug: bool,
    deps: &mut DependencyRecord,
) -> BundleResult<usize> {
    let mut copied = 0;

    for entry in entries {
        let target = match &entry.dest {
            Some(dest) => redist_dir.join(dest),
            None => redist_dir.to_path_buf(),
        };
        create_dir(&target)?;

        let debug_files: &[String] = if debug { &entry.debug_files } else { &[] };
        for file in entry.files.iter().chain(debug_files) {
            let source = entry.source.join(file);
            copy_into(&source, &target)?;
            deps.add(&source);
            copied += 1;
        }
    }

    debug!("Copied {} redistributable files", copied);
    Ok(copied)
}
