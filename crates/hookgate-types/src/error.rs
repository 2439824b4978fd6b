//! Common error types

use thiserror::Error;

/// Errors raised while constructing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Identifier was empty
    #[error("{0} must not be empty")]
    EmptyId(&'static str),

    /// Unknown protection mode string
    #[error("unknown protection mode: {0}")]
    UnknownProtectionMode(String),
}
