//! Error types for the OCGCore bindings

use std::path::PathBuf;
use thiserror::Error;

/// Result type for OCGCore operations
pub type Result<T> = std::result::Result<T, OcgError>;

/// Errors that can occur while loading or calling the native library
#[derive(Debug, Error)]
pub enum OcgError {
    /// No library path was given
    #[error("Library path is required")]
    EmptyPath,

    /// Library path does not exist
    #[error("Library not found at path: {}", .0.display())]
    LibraryNotFound(PathBuf),

    /// Library path exists but is not a regular file
    #[error("Path is not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Library file exists but cannot be read
    #[error("Library file is not readable: {}", .path.display())]
    NotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dynamic loader rejected the library
    #[error("Failed to load library '{}': {message}", .path.display())]
    LoadError {
        path: PathBuf,
        message: String,
    },

    /// Library does not export a required symbol
    #[error("Symbol '{symbol}' not found in library '{library}'")]
    SymbolNotFound {
        library: String,
        symbol: String,
    },

    /// A create call returned a null duel pointer
    #[error("{method} returned a null handle")]
    NullHandle {
        method: &'static str,
    },

    /// A text argument cannot cross the boundary as a C string
    #[error("Invalid string argument for {method}: {message}")]
    InvalidString {
        method: &'static str,
        message: String,
    },

    /// Input data does not fit in a native buffer
    #[error("Buffer overflow: {len} bytes exceed capacity {capacity}")]
    BufferOverflow {
        len: usize,
        capacity: usize,
    },

    /// Seed buffer holds fewer words than requested
    #[error("Seed buffer too short: expected {expected} bytes, got {actual}")]
    SeedBufferTooShort {
        expected: usize,
        actual: usize,
    },

    /// A call failed inside a non-native implementation of the bindings
    #[error("FFI call failed: {0}")]
    FfiCallFailed(String),
}

impl OcgError {
    /// Create a load error
    pub fn load_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        OcgError::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a symbol not found error
    pub fn symbol_not_found(library: impl Into<String>, symbol: impl Into<String>) -> Self {
        OcgError::SymbolNotFound {
            library: library.into(),
            symbol: symbol.into(),
        }
    }

    /// Whether the error was raised while loading the library
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            OcgError::EmptyPath
                | OcgError::LibraryNotFound(_)
                | OcgError::NotAFile(_)
                | OcgError::NotReadable { .. }
                | OcgError::LoadError { .. }
                | OcgError::SymbolNotFound { .. }
        )
    }
}
