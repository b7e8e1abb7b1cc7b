//! Error types for statecell operations.
//!
//! This module defines [`CellError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `CellError` for failures that need distinct handling (decode,
//!   encode, store access)
//! - Use `anyhow::Error` (via `CellError::Other`) for unexpected errors
//! - Failures surface at the point of the failing call; the crate performs
//!   no retries and no fallback substitution

use thiserror::Error;

/// Core error type for statecell operations.
#[derive(Debug, Error)]
pub enum CellError {
    /// Stored string could not be decoded at bind time.
    #[error("Failed to decode stored value for key '{key}': {message}")]
    DecodeFailure { key: String, message: String },

    /// Value could not be encoded at reconciliation time.
    #[error("Failed to encode value for key '{key}': {message}")]
    EncodeFailure { key: String, message: String },

    /// The durable store rejected a read, write, or removal.
    #[error("Store {operation} failed for key '{key}': {message}")]
    StoreUnavailable {
        operation: &'static str,
        key: String,
        message: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for statecell operations.
pub type Result<T> = std::result::Result<T, CellError>;
