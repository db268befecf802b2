//! Error types for Trellis core primitives.

use thiserror::Error;

/// The error type for core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No tokio runtime is available in the calling context.
    #[error("no async runtime available; construct inside a tokio runtime")]
    NoRuntime,

    /// The timer ID is invalid, already fired, or already stopped.
    #[error("invalid or expired timer ID")]
    InvalidTimerId,
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
