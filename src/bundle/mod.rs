//! Bundle assembly
//!
//! The orchestrator validates inputs, prepares the output tree, runs the
//! transcoders over the manifest and packages the bundle directory into a
//! deterministic archive.

pub mod archive;
pub mod layout;
pub mod license;
pub mod orchestrator;
pub mod redist;

pub use archive::write_archive;
pub use layout::OutputLayout;
pub use orchestrator::{BuildOptions, BuildOutcome, BuildState, Orchestrator};
