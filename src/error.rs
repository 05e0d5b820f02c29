//! Error types for Effuse.
//!
//! Protocol-level failures (bad login names, unknown commands, denied
//! joins) are advisory text written back to the client and never surface
//! here; this error type covers the faults that can actually stop the
//! server, namely I/O and configuration problems.

use thiserror::Error;

/// Common error type for Effuse.
#[derive(Error, Debug)]
pub enum EffuseError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for Effuse operations.
pub type Result<T> = std::result::Result<T, EffuseError>;
