//! Signing key derivation
//!
//! Every signing key is `HMAC-SHA256(tenant secret, context)`. Session keys mix
//! in a fixed label so they are unrelated to any other MAC computed with the
//! same secret; legacy link keys use the instance's key material as-is so that
//! links already in circulation keep verifying.

use hookgate_types::{InstanceId, TenantSecret};

use crate::crypto::{hmac_sha256, MAC_LENGTH};
use crate::AuthError;

/// Domain-separation label for session cookie keys
pub const SESSION_KEY_LABEL: &[u8] = b"JWT_COOKIE|";

/// Derived 256-bit signing key, scoped to a single verification or mint
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey([u8; MAC_LENGTH]);

impl SigningKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; MAC_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; MAC_LENGTH] {
        &self.0
    }

    /// MAC the concatenation of `parts` under this key
    pub fn mac(&self, parts: &[&[u8]]) -> [u8; MAC_LENGTH] {
        hmac_sha256(&self.0, parts)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

/// Derive the key for legacy compact link tokens.
///
/// # Errors
/// Returns [`AuthError::InvalidInput`] if the secret or key material is empty.
pub fn derive_legacy_key(
    secret: &TenantSecret,
    legacy_key_material: &[u8],
) -> Result<SigningKey, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidInput("tenant secret is empty"));
    }
    if legacy_key_material.is_empty() {
        return Err(AuthError::InvalidInput("legacy key material is empty"));
    }
    Ok(SigningKey(hmac_sha256(secret.as_bytes(), &[legacy_key_material])))
}

/// Derive the key for an instance's session cookies.
///
/// # Errors
/// Returns [`AuthError::InvalidInput`] if the secret is empty.
pub fn derive_session_key(
    secret: &TenantSecret,
    instance_id: &InstanceId,
) -> Result<SigningKey, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidInput("tenant secret is empty"));
    }
    if instance_id.as_str().is_empty() {
        return Err(AuthError::InvalidInput("instance id is empty"));
    }
    Ok(SigningKey(hmac_sha256(
        secret.as_bytes(),
        &[SESSION_KEY_LABEL, instance_id.as_str().as_bytes()],
    )))
}
