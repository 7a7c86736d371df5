//! mkbundle - incremental asset bundle builder
//!
//! Runs external shader, font atlas and texture tools over the items of a
//! bundle manifest, skipping any tool whose inputs are unchanged since the
//! previous run, and packages the results into one archive.

pub mod bundle;
pub mod cache;
pub mod cli;
pub mod config;
pub mod depfile;
pub mod error;
pub mod manifest;
pub mod tool;
pub mod transcode;
pub mod ui;

pub use error::{BundleError, BundleResult};
