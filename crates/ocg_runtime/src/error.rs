//! Error types for the duel runtime

use ocg_core::OcgError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that stop the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Native binding failure
    #[error(transparent)]
    Core(#[from] OcgError),

    /// Config file could not be read
    #[error("Failed to read config '{}': {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config '{}': {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config parsed but is unusable
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Command line could not be understood
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Call trace file error
    #[error("Call trace error: {0}")]
    Trace(#[from] std::io::Error),
}
