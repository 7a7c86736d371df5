//! Tool configuration schema
//!
//! Configuration is stored at `~/.config/mkbundle/tools.toml` unless a path
//! is given on the command line.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// External tool locations
    pub tools: ToolsConfig,

    /// Shader compilation defaults
    #[serde(default)]
    pub shader: ShaderConfig,

    /// Redistributable files copied next to the bundle
    #[serde(default)]
    pub redist: Vec<RedistConfig>,
}

/// External tool locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// HLSL compiler (dxc)
    pub shader_compiler: PathBuf,

    /// Multi-channel signed distance field atlas generator
    pub atlas_generator: PathBuf,

    /// Block compression texture tool
    pub texture_compressor: PathBuf,

    /// Per-invocation time limit in seconds (absent or 0 = unlimited)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ToolsConfig {
    /// Configured time limit for a single tool run
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Shader compilation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Shader model used when a target does not name one
    pub model: String,

    /// Extension of compiled shader objects
    pub extension: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            model: "6_0".to_string(),
            extension: "cso".to_string(),
        }
    }
}

/// A directory of redistributable files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedistConfig {
    /// Directory the files are copied from
    pub source: PathBuf,

    /// Subdirectory of the redist output directory to copy into
    #[serde(default)]
    pub dest: Option<PathBuf>,

    /// Files always copied
    #[serde(default)]
    pub files: Vec<String>,

    /// Files copied only for debug builds
    #[serde(default)]
    pub debug_files: Vec<String>,
}
