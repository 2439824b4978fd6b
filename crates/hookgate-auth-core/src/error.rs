//! Auth errors
//!
//! Two layers: [`AuthError`] is what propagates out of the gate (programmer
//! errors and collaborator failures), while [`CredentialFailure`] is the closed
//! set of reasons a presented credential was refused. Credential failures are
//! logged but never leave the gate in detail.

use hookgate_store::StoreError;
use thiserror::Error;

use crate::compact::CompactReason;
use crate::jwt::JwtReason;

/// Errors that propagate out of the gate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Empty secret or key context, bad config value (fatal to the call)
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Instance or webhook does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Secret or record store failure; callers may retry or show a generic
    /// error page instead of a login prompt
    #[error("external service unavailable: {0}")]
    ExternalUnavailable(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::ExternalUnavailable(_) => 503,
            Self::InvalidInput(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ExternalUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Unavailable(_) | StoreError::Fixture(_) => {
                tracing::error!("Store error: {}", err);
                Self::ExternalUnavailable(err.to_string())
            }
        }
    }
}

/// Why a presented credential was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    /// Bad length, bad base64, bad JSON, unknown version or header
    #[error("malformed credential")]
    Decode,

    /// Compact token tag did not match
    #[error("MAC mismatch")]
    MacMismatch,

    /// Session JWT signature did not match
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Credential is past its expiry (or before `nbf`)
    #[error("credential expired")]
    Expired,

    /// Revocation counter moved on since the credential was minted
    #[error("credential revoked")]
    Revoked,

    /// Issuer, audience or instance binding did not match
    #[error("claim mismatch")]
    ClaimMismatch,
}

impl CredentialFailure {
    /// Stable label for logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::MacMismatch => "mac_mismatch",
            Self::SignatureMismatch => "signature_mismatch",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
            Self::ClaimMismatch => "claim_mismatch",
        }
    }
}

impl From<CompactReason> for CredentialFailure {
    fn from(reason: CompactReason) -> Self {
        match reason {
            CompactReason::Len | CompactReason::Ver => Self::Decode,
            CompactReason::Mac => Self::MacMismatch,
            CompactReason::Exp => Self::Expired,
        }
    }
}

impl From<JwtReason> for CredentialFailure {
    fn from(reason: JwtReason) -> Self {
        match reason {
            JwtReason::Format | JwtReason::Header | JwtReason::Parse => Self::Decode,
            JwtReason::Sig => Self::SignatureMismatch,
            JwtReason::Iss | JwtReason::Aud => Self::ClaimMismatch,
            JwtReason::Nbf | JwtReason::Exp => Self::Expired,
        }
    }
}
