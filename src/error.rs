//! Error types for the stereo hand cursor library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Calibration file missing, unreadable, or malformed
    #[error("Calibration error: {0}")]
    Calibration(String),

    /// Configuration invariant violated
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pipeline thread failed to start or join
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
