//! Error types for isomesh

use thiserror::Error;

/// Main error type for isomesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for isomesh operations
pub type Result<T> = std::result::Result<T, Error>;
