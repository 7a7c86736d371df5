//! Error types for mkbundle
//!
//! All modules use `BundleResult<T>` as their return type. External tool
//! failures are not errors: they are reported as [`crate::tool::ToolStatus`].

use std::path::PathBuf;
use thiserror::Error;

/// Process exit code for input validation and configuration failures
pub const EXIT_VALIDATION: u8 = 2;

/// Process exit code for any other fatal error
pub const EXIT_FAILURE: u8 = 1;

/// Result type alias for mkbundle operations
pub type BundleResult<T> = Result<T, BundleError>;

/// All errors that can occur while building a bundle
#[derive(Error, Debug)]
pub enum BundleError {
    // Input validation errors
    #[error("Bundle manifest does not exist: {0}")]
    ManifestNotFound(PathBuf),

    #[error("Input directory does not exist: {0}")]
    InputDirNotFound(PathBuf),

    // Configuration errors
    #[error("Tool configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid bundle manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("Corrupt build cache at {path}: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BundleError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the error was raised while validating the command line inputs
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ManifestNotFound(_) | Self::InputDirNotFound(_))
    }

    /// Whether the error is a fatal configuration problem
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_)
                | Self::ConfigInvalid { .. }
                | Self::ManifestInvalid { .. }
                | Self::CacheCorrupt { .. }
        )
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        if self.is_validation() || self.is_configuration() {
            EXIT_VALIDATION
        } else {
            EXIT_FAILURE
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound(_) => {
                Some("Pass --config <file> or set MKBUNDLE_CONFIG to a tools.toml")
            }
            Self::CacheCorrupt { .. } => {
                Some("Delete the cache file to force a full rebuild")
            }
            Self::ManifestNotFound(_) => Some("Check the --bundle argument"),
            Self::InputDirNotFound(_) => Some("Check the --indir argument"),
            _ => None,
        }
    }
}
