//! Error types for the sync adapter

use thiserror::Error;

/// Result type for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter errors
///
/// These cover construction, configuration and admission control. Remote
/// rejections are not errors at this level: record operations fold them
/// into the [`Failure`](crate::types::Failure) side of their envelope.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout
    #[error("Timeout after {seconds}s: {operation}")]
    Timeout {
        /// Timeout duration
        seconds: u64,
        /// Operation
        operation: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
