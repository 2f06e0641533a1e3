//! Error types for undat64

use thiserror::Error;

/// Main error type for undat64 operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid DAT64 header: {0}")]
    InvalidHeader(String),

    #[error("Read out of range: offset {offset} in buffer of {len} bytes")]
    OutOfRange { offset: usize, len: usize },

    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// Result type alias for undat64 operations
pub type Result<T> = std::result::Result<T, Error>;
