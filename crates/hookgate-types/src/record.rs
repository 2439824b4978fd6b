//! Webhook, instance and tenant secret records

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{InstanceId, TenantId, TypesError, WebhookId};

/// How access to a webhook's instances is protected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionMode {
    /// Publicly reachable
    #[default]
    None,
    /// Shared password exchanged for a session cookie
    Password,
    /// Delegated to the external identity provider
    User,
}

impl std::fmt::Display for ProtectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Password => "password",
            Self::User => "user",
        };
        f.write_str(s)
    }
}

impl FromStr for ProtectionMode {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "password" => Ok(Self::Password),
            "user" => Ok(Self::User),
            other => Err(TypesError::UnknownProtectionMode(other.to_string())),
        }
    }
}

/// Webhook record (read-only to the gate)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    /// Webhook ID
    pub id: WebhookId,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Protection mode
    #[serde(default)]
    pub protection: ProtectionMode,
}

/// Instance record (read-only to the gate)
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Instance ID
    pub id: InstanceId,
    /// Webhook this instance was deployed from
    pub webhook_id: WebhookId,
    /// Revocation counter; bumping it invalidates every outstanding session
    #[serde(default)]
    pub revocation_counter: u32,
    /// Key material for links issued before session cookies existed
    #[serde(default)]
    pub legacy_key: Option<String>,
    /// Shared password for password-protected webhooks
    #[serde(default)]
    pub password: Option<String>,
}

impl Instance {
    /// Legacy key material as bytes, if present and non-empty
    pub fn legacy_key_material(&self) -> Option<&[u8]> {
        self.legacy_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::as_bytes)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("webhook_id", &self.webhook_id)
            .field("revocation_counter", &self.revocation_counter)
            .field("has_legacy_key", &self.legacy_key.is_some())
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

/// Long-term tenant secret, as returned by the secret store
///
/// Lives for one request only; never cached or persisted by the gate.
#[derive(Clone, PartialEq, Eq)]
pub struct TenantSecret(Vec<u8>);

impl TenantSecret {
    /// Wrap raw secret bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Secret bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the secret is empty (unusable for key derivation)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for TenantSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantSecret")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}
