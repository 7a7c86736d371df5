//! Bundle manifest parsing
//!
//! The manifest is a JSON document listing the licenses, fonts, shaders and
//! textures that make up a bundle. Every item path is relative to the input
//! directory.

use crate::error::{BundleError, BundleResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Em size used for font atlases that do not specify one
pub const DEFAULT_EM_SIZE: u32 = 64;

/// Mip count used for textures that do not specify one
pub const DEFAULT_MIPS: u32 = 1;

/// Parsed bundle manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Third party licenses to ship
    #[serde(default)]
    pub licenses: Vec<LicenseItem>,

    /// Fonts to render into atlases
    #[serde(default)]
    pub fonts: Vec<FontItem>,

    /// HLSL sources to compile
    #[serde(default)]
    pub shaders: Vec<ShaderItem>,

    /// Images to block compress
    #[serde(default)]
    pub textures: Vec<TextureItem>,
}

/// A third party license
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseItem {
    /// License text file
    pub path: PathBuf,

    /// Short identifier, used for the copied file name
    pub id: String,

    /// Project name shown in the aggregated license file
    pub name: String,

    /// Project homepage
    pub url: String,
}

/// A font rendered into a single atlas
#[derive(Debug, Clone, Deserialize)]
pub struct FontItem {
    /// Atlas name
    pub name: String,

    /// Font file, or the directory holding `files`
    pub path: PathBuf,

    /// Font files under `path` combined into one atlas
    #[serde(default)]
    pub files: Option<Vec<PathBuf>>,

    /// Target em size in pixels
    #[serde(default)]
    pub em_size: Option<u32>,
}

impl FontItem {
    /// Resolve the font files this atlas is generated from
    pub fn font_files(&self, input_dir: &Path) -> Vec<PathBuf> {
        let path = input_dir.join(&self.path);
        match &self.files {
            Some(files) => files.iter().map(|file| path.join(file)).collect(),
            None => vec![path],
        }
    }

    pub fn em_size(&self) -> u32 {
        self.em_size.unwrap_or(DEFAULT_EM_SIZE)
    }
}

/// An HLSL source compiled for one or more stages
#[derive(Debug, Clone, Deserialize)]
pub struct ShaderItem {
    /// Output name prefix
    pub name: String,

    /// HLSL source file
    pub path: PathBuf,

    /// Stages to compile
    pub targets: Vec<ShaderTarget>,
}

/// One compiled stage of a shader
#[derive(Debug, Clone, Deserialize)]
pub struct ShaderTarget {
    /// Stage profile prefix, e.g. `vs` or `ps`
    pub target: String,

    /// Entry point symbol
    pub entry: String,

    /// Shader model, e.g. `6_6`
    #[serde(default)]
    pub model: Option<String>,

    /// Preprocessor defines, `NAME` or `NAME=VALUE`
    #[serde(default)]
    pub defines: Vec<String>,

    /// Enable native 16-bit types
    #[serde(default, rename = "16bit_types")]
    pub enable_16bit_types: bool,
}

/// An image block compressed into a DDS texture
#[derive(Debug, Clone, Deserialize)]
pub struct TextureItem {
    /// Output name
    pub name: String,

    /// Source image
    pub path: PathBuf,

    /// Number of mip levels to generate
    #[serde(default)]
    pub mips: Option<u32>,
}

impl TextureItem {
    pub fn mips(&self) -> u32 {
        self.mips.unwrap_or(DEFAULT_MIPS)
    }
}

impl Manifest {
    /// Parse a manifest from a JSON file on disk
    pub async fn from_file(path: &Path) -> BundleResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            BundleError::io(format!("reading bundle manifest {}", path.display()), e)
        })?;
        Self::parse(&content, path)
    }

    /// Parse a manifest from a JSON string; `origin` is used in errors
    pub fn parse(content: &str, origin: &Path) -> BundleResult<Self> {
        serde_json::from_str(content).map_err(|e| BundleError::ManifestInvalid {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Total number of items across all sections
    pub fn item_count(&self) -> usize {
        self.licenses.len() + self.fonts.len() + self.shaders.len() + self.textures.len()
    }
}
