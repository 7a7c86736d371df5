//! Output directory layout and filesystem helpers
//!
//! ```text
//! <outdir>/
//!   bundle/             cleared every run, archived
//!     LICENSES.md
//!     licenses/ fonts/ textures/ shaders/ pdb/
//!   intermediate/       tool outputs, kept between runs
//!     fonts/ textures/ pdb/
//!     shaders/release/ shaders/debug/
//!   redist/             redistributable runtime files
//!   bundle.cache.json   content cache
//! ```

use crate::cache::CACHE_FILE_NAME;
use crate::error::{BundleError, BundleResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LICENSES_DIR: &str = "licenses";
pub const FONTS_DIR: &str = "fonts";
pub const TEXTURES_DIR: &str = "textures";
pub const SHADERS_DIR: &str = "shaders";
pub const PDB_DIR: &str = "pdb";

/// Subdirectories created inside the bundle directory
pub const BUNDLE_SUBDIRS: [&str; 5] = [LICENSES_DIR, FONTS_DIR, TEXTURES_DIR, SHADERS_DIR, PDB_DIR];

/// Subdirectories created inside the intermediate directory
pub const INTERMEDIATE_SUBDIRS: [&str; 4] = [FONTS_DIR, TEXTURES_DIR, SHADERS_DIR, PDB_DIR];

/// Paths derived from the output directory
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory archived into the bundle
    pub fn bundle_dir(&self) -> PathBuf {
        self.root.join("bundle")
    }

    pub fn bundle_subdir(&self, name: &str) -> PathBuf {
        self.bundle_dir().join(name)
    }

    /// Persistent tool output directory
    pub fn intermediate_dir(&self) -> PathBuf {
        self.root.join("intermediate")
    }

    pub fn intermediate_subdir(&self, name: &str) -> PathBuf {
        self.intermediate_dir().join(name)
    }

    /// Shader objects are kept apart per debug setting, so switching it
    /// never reuses objects built the other way
    pub fn shader_intermediate_dir(&self, debug: bool) -> PathBuf {
        let variant = if debug { "debug" } else { "release" };
        self.intermediate_subdir(SHADERS_DIR).join(variant)
    }

    pub fn redist_dir(&self) -> PathBuf {
        self.root.join("redist")
    }

    pub fn cache_file(&self) -> PathBuf {
        self.root.join(CACHE_FILE_NAME)
    }

    /// Empty the bundle directory and (re)create the fixed subtrees
    ///
    /// The bundle directory itself is kept because build system file
    /// watchers may hold a handle to it.
    pub fn prepare(&self) -> BundleResult<()> {
        let bundle = self.bundle_dir();
        clear_dir_contents(&bundle)?;

        for name in BUNDLE_SUBDIRS {
            create_dir(&bundle.join(name))?;
        }
        for name in INTERMEDIATE_SUBDIRS {
            create_dir(&self.intermediate_subdir(name))?;
        }
        for debug in [false, true] {
            create_dir(&self.shader_intermediate_dir(debug))?;
        }
        create_dir(&self.redist_dir())?;

        debug!("Prepared output directories under {}", self.root.display());
        Ok(())
    }
}

/// Create a directory and its parents
pub fn create_dir(dir: &Path) -> BundleResult<()> {
    fs::create_dir_all(dir)
        .map_err(|e| BundleError::io(format!("creating directory {}", dir.display()), e))
}

/// Recursively delete everything inside `dir`, keeping `dir` itself
pub fn clear_dir_contents(dir: &Path) -> BundleResult<()> {
    if !dir.exists() {
        return Ok(());
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| BundleError::io(format!("reading directory {}", dir.display()), e))?;

    for entry in entries {
        let entry =
            entry.map_err(|e| BundleError::io(format!("reading directory {}", dir.display()), e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| BundleError::io(format!("reading metadata of {}", path.display()), e))?;

        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| BundleError::io(format!("removing {}", path.display()), e))?;
    }

    Ok(())
}

/// Copy `src` to the exact path `dst`
pub fn copy_file(src: &Path, dst: &Path) -> BundleResult<()> {
    debug!("Copying {} to {}", src.display(), dst.display());
    fs::copy(src, dst).map_err(|e| {
        BundleError::io(format!("copying {} to {}", src.display(), dst.display()), e)
    })?;
    Ok(())
}

/// Copy `src` into `dir`, keeping its file name
pub fn copy_into(src: &Path, dir: &Path) -> BundleResult<PathBuf> {
    let name = src
        .file_name()
        .ok_or_else(|| BundleError::PathNotFound(src.to_path_buf()))?;
    let dst = dir.join(name);
    copy_file(src, &dst)?;
    Ok(dst)
}
