//! Collaborator traits
//!
//! The gate only ever reads through these interfaces. Implementations own
//! their own timeout and retry policy.

use async_trait::async_trait;
use hookgate_types::{Instance, InstanceId, TenantId, TenantSecret, Webhook, WebhookId};

use crate::error::StoreResult;

/// Tenant secret store
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the long-term shared secret of a tenant
    async fn get_secret(&self, tenant_id: &TenantId) -> StoreResult<TenantSecret>;
}

/// Webhook and instance record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch an instance by ID
    async fn get_instance(&self, id: &InstanceId) -> StoreResult<Instance>;

    /// Fetch a webhook by ID
    async fn get_webhook(&self, id: &WebhookId) -> StoreResult<Webhook>;
}
