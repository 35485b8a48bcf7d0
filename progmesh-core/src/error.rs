//! Error types for progmesh

use thiserror::Error;

/// Main error type for progmesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for progmesh operations
pub type Result<T> = std::result::Result<T, Error>;
