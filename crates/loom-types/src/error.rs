//! Error types for the loom cloth data layer.
//!
//! All crates return `LoomResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the loom crates.
#[derive(Debug, Error)]
pub enum LoomError {
    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A cloth component could not be set up. The component stays
    /// uninitialized until the next successful rebuild.
    #[error("Setup failed: {0}")]
    SetupFailure(String),

    /// The external cloth solver rejected a request.
    #[error("Solver error: {0}")]
    Solver(String),

    /// Two buffers that must be index-aligned have different lengths.
    #[error("Buffer length mismatch: expected {expected}, got {actual}")]
    BufferMismatch {
        expected: usize,
        actual: usize,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, LoomError>`.
pub type LoomResult<T> = Result<T, LoomError>;
