//! External identity provider seam
//!
//! Webhooks protected in `user` mode delegate the whole decision to a hosted
//! user directory. Its login protocol lives elsewhere; the gate only asks
//! "given these externally-issued tokens, who is this and may they see the
//! webhook?".

use async_trait::async_trait;
use hookgate_store::StoreResult;
use hookgate_types::Webhook;

/// Externally-issued tokens presented with a request
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IdentityCredentials {
    /// Identity/access token issued by the provider
    pub id_token: Option<String>,
    /// Refresh token issued by the provider
    pub refresh_token: Option<String>,
}

impl IdentityCredentials {
    /// Whether no token was presented at all
    pub fn is_empty(&self) -> bool {
        self.id_token.is_none() && self.refresh_token.is_none()
    }
}

impl std::fmt::Debug for IdentityCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCredentials")
            .field("has_id_token", &self.id_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// Provider answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityOutcome {
    /// Authenticated and allowed to see the webhook
    Authorized {
        /// Subject reported by the provider, for logs
        subject: String,
        /// Fresh provider token to hand back to the client, if one was minted
        refreshed_credential: Option<String>,
    },
    /// Authenticated, but not allowed to see the webhook
    Unauthorized { subject: String },
    /// No usable identity
    NotAuthenticated,
}

/// External identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify the presented tokens for `webhook`.
    ///
    /// Invalid or expired tokens are `NotAuthenticated`, not errors; errors
    /// are reserved for the provider being unreachable.
    async fn authenticate(
        &self,
        credentials: &IdentityCredentials,
        webhook: &Webhook,
    ) -> StoreResult<IdentityOutcome>;
}

/// Provider for deployments without an external directory: nobody is ever
/// authenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn authenticate(
        &self,
        _credentials: &IdentityCredentials,
        webhook: &Webhook,
    ) -> StoreResult<IdentityOutcome> {
        tracing::debug!(webhook_id = %webhook.id, "No identity provider configured");
        Ok(IdentityOutcome::NotAuthenticated)
    }
}
