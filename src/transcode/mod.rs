//! Asset transcoders
//!
//! Each transcoder turns manifest items into deployable artifacts with one
//! external tool. They share the same skeleton:
//!
//! 1. record every input in the dependency file, cached or not
//! 2. ask the content cache whether any input changed
//! 3. skip the tool when nothing changed and the previous outputs exist
//! 4. otherwise run the tool, discarding partial outputs if it fails
//!
//! Outputs are written to a persistent intermediate directory so skipped
//! items can still be assembled into a freshly cleared bundle.

pub mod atlas;
pub mod shader;
pub mod texture;

pub use atlas::AtlasGenerator;
pub use shader::ShaderCompiler;
pub use texture::TextureCompressor;

use crate::cache::ContentCache;
use crate::depfile::DependencyRecord;
use crate::tool::ToolRunner;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

/// Shared state the transcoders read and update during a build
pub struct TranscodeContext<'a> {
    pub cache: &'a mut ContentCache,
    pub deps: &'a mut DependencyRecord,
    pub runner: &'a dyn ToolRunner,
}

fn outputs_present(outputs: &[PathBuf]) -> bool {
    outputs.iter().all(|output| output.is_file())
}

/// Remove outputs of a failed item so the next run cannot mistake them for
/// up to date artifacts
fn discard_outputs(outputs: &[PathBuf]) {
    for output in outputs {
        if let Err(e) = fs::remove_file(output) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove stale output {}: {}", output.display(), e);
            }
        }
    }
}
