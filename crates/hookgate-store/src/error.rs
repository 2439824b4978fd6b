//! Store errors

use thiserror::Error;

/// Errors returned by external collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Record or secret does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend could not be reached or answered with an error
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Fixture file could not be read or parsed
    #[error("invalid fixtures: {0}")]
    Fixture(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
