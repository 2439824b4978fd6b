//! In-memory stores
//!
//! Backed by `DashMap` so the service can share one copy across requests.
//! Records can be seeded from a JSON fixture file:
//!
//! ```json
//! {
//!   "tenants": { "acme": "s3cr3t" },
//!   "webhooks": [{ "id": "W1", "tenant_id": "acme", "protection": "password" }],
//!   "instances": [{ "id": "I1", "webhook_id": "W1", "password": "hunter2" }]
//! }
//! ```

use async_trait::async_trait;
use dashmap::DashMap;
use hookgate_types::{Instance, InstanceId, TenantId, TenantSecret, Webhook, WebhookId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::repo::{RecordStore, SecretStore};

/// In-memory record store
#[derive(Default, Clone)]
pub struct MemoryRecordStore {
    instances: Arc<DashMap<InstanceId, Instance>>,
    webhooks: Arc<DashMap<WebhookId, Webhook>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an instance
    pub fn insert_instance(&self, instance: Instance) {
        self.instances.insert(instance.id.clone(), instance);
    }

    /// Insert or replace a webhook
    pub fn insert_webhook(&self, webhook: Webhook) {
        self.webhooks.insert(webhook.id.clone(), webhook);
    }

    /// Increment an instance's revocation counter, returning the new value
    pub fn bump_revocation(&self, id: &InstanceId) -> StoreResult<u32> {
        let mut instance = self
            .instances
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("instance {id}")))?;
        // Wrapping to 0 would revalidate sessions minted at counter 0
        instance.revocation_counter = instance
            .revocation_counter
            .checked_add(1)
            .ok_or_else(|| {
                StoreError::Unavailable(format!("revocation counter exhausted for instance {id}"))
            })?;
        Ok(instance.revocation_counter)
    }

    /// Number of instances held
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_instance(&self, id: &InstanceId) -> StoreResult<Instance> {
        self.instances
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(format!("instance {id}")))
    }

    async fn get_webhook(&self, id: &WebhookId) -> StoreResult<Webhook> {
        self.webhooks
            .get(id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(format!("webhook {id}")))
    }
}

impl std::fmt::Debug for MemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRecordStore")
            .field("instances", &self.instances.len())
            .field("webhooks", &self.webhooks.len())
            .finish()
    }
}

/// In-memory secret store
#[derive(Default, Clone)]
pub struct MemorySecretStore {
    secrets: Arc<DashMap<TenantId, TenantSecret>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or rotate a tenant secret
    pub fn insert_secret(&self, tenant_id: TenantId, secret: TenantSecret) {
        self.secrets.insert(tenant_id, secret);
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get_secret(&self, tenant_id: &TenantId) -> StoreResult<TenantSecret> {
        self.secrets
            .get(tenant_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound(format!("secret for tenant {tenant_id}")))
    }
}

impl std::fmt::Debug for MemorySecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySecretStore")
            .field("tenants", &self.secrets.len())
            .finish_non_exhaustive()
    }
}

/// Fixture file contents
#[derive(Debug, Default, Deserialize)]
pub struct Fixtures {
    /// Tenant ID -> secret (UTF-8)
    #[serde(default)]
    pub tenants: HashMap<TenantId, String>,
    #[serde(default)]
    pub webhooks: Vec<Webhook>,
    #[serde(default)]
    pub instances: Vec<Instance>,
}

impl Fixtures {
    /// Parse fixtures from a JSON string
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::Fixture(e.to_string()))
    }

    /// Build both stores from the fixtures
    pub fn into_stores(self) -> (MemoryRecordStore, MemorySecretStore) {
        let records = MemoryRecordStore::new();
        let secrets = MemorySecretStore::new();

        for (tenant_id, secret) in self.tenants {
            secrets.insert_secret(tenant_id, TenantSecret::new(secret.into_bytes()));
        }
        for webhook in self.webhooks {
            records.insert_webhook(webhook);
        }
        for instance in self.instances {
            records.insert_instance(instance);
        }

        (records, secrets)
    }
}

/// Load a JSON fixture file into fresh in-memory stores
pub fn load_fixtures(
    path: impl AsRef<Path>,
) -> StoreResult<(MemoryRecordStore, MemorySecretStore)> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read fixtures");
        StoreError::Fixture(format!("{}: {e}", path.display()))
    })?;
    let fixtures = Fixtures::from_json(&json)?;
    tracing::debug!(
        tenants = fixtures.tenants.len(),
        webhooks = fixtures.webhooks.len(),
        instances = fixtures.instances.len(),
        "Fixtures loaded"
    );
    Ok(fixtures.into_stores())
}
