//! Fakes and fixtures for gate tests

#![allow(dead_code)]

use async_trait::async_trait;
use hookgate_auth_core::{GateConfig, IdentityCredentials, IdentityOutcome, IdentityProvider, SessionGate};
use hookgate_store::{
    MemoryRecordStore, MemorySecretStore, SecretStore, StoreError, StoreResult,
};
use hookgate_types::{
    Instance, InstanceId, ProtectionMode, TenantId, TenantSecret, Webhook, WebhookId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TENANT_SECRET: &[u8] = b"s3cr3t";

/// Stores seeded with one tenant and a spread of webhooks/instances:
///
/// | instance | webhook | protection | legacy key | password |
/// |----------|---------|------------|------------|----------|
/// | I1       | W-pw    | password   | -          | hunter2  |
/// | I2       | W-pw    | password   | yes        | hunter2  |
/// | I3       | W-open  | none       | -          | -        |
/// | I4       | W-user  | user       | -          | -        |
pub struct TestWorld {
    pub records: Arc<MemoryRecordStore>,
    pub secrets: Arc<MemorySecretStore>,
}

impl TestWorld {
    pub fn id(&self, id: &str) -> InstanceId {
        InstanceId::parse(id).unwrap()
    }

    pub fn secret(&self) -> TenantSecret {
        TenantSecret::new(TENANT_SECRET.to_vec())
    }
}

pub fn world() -> TestWorld {
    let records = MemoryRecordStore::new();
    let secrets = MemorySecretStore::new();
    let tenant = TenantId::parse("acme").unwrap();
    secrets.insert_secret(tenant.clone(), TenantSecret::new(TENANT_SECRET.to_vec()));

    for (id, protection) in [
        ("W-pw", ProtectionMode::Password),
        ("W-open", ProtectionMode::None),
        ("W-user", ProtectionMode::User),
    ] {
        records.insert_webhook(Webhook {
            id: WebhookId::parse(id).unwrap(),
            tenant_id: tenant.clone(),
            protection,
        });
    }

    for (id, webhook, legacy_key, password) in [
        ("I1", "W-pw", None, Some("hunter2")),
        ("I2", "W-pw", Some("legacy-material"), Some("hunter2")),
        ("I3", "W-open", None, None),
        ("I4", "W-user", None, None),
    ] {
        records.insert_instance(Instance {
            id: InstanceId::parse(id).unwrap(),
            webhook_id: WebhookId::parse(webhook).unwrap(),
            revocation_counter: 0,
            legacy_key: legacy_key.map(str::to_string),
            password: password.map(str::to_string),
        });
    }

    TestWorld {
        records: Arc::new(records),
        secrets: Arc::new(secrets),
    }
}

pub fn gate(world: &TestWorld, config: GateConfig) -> SessionGate<MemoryRecordStore, MemorySecretStore> {
    SessionGate::new(
        config,
        Arc::clone(&world.records),
        Arc::clone(&world.secrets),
        Arc::new(hookgate_auth_core::DisabledIdentityProvider),
    )
}

pub fn gate_with_identity(
    world: &TestWorld,
    config: GateConfig,
    identity: Arc<StubIdentityProvider>,
) -> SessionGate<MemoryRecordStore, MemorySecretStore, StubIdentityProvider> {
    SessionGate::new(
        config,
        Arc::clone(&world.records),
        Arc::clone(&world.secrets),
        identity,
    )
}

/// Secret store that is always down
#[derive(Debug, Default)]
pub struct FailingSecretStore;

#[async_trait]
impl SecretStore for FailingSecretStore {
    async fn get_secret(&self, _tenant_id: &TenantId) -> StoreResult<TenantSecret> {
        Err(StoreError::Unavailable("secrets backend timed out".to_string()))
    }
}

/// Identity provider returning a canned outcome and counting calls
#[derive(Debug)]
pub struct StubIdentityProvider {
    outcome: StoreResult<IdentityOutcome>,
    calls: AtomicUsize,
}

impl StubIdentityProvider {
    pub fn new(outcome: IdentityOutcome) -> Self {
        Self {
            outcome: Ok(outcome),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Err(StoreError::Unavailable("directory unreachable".to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn authenticate(
        &self,
        _credentials: &IdentityCredentials,
        _webhook: &Webhook,
    ) -> StoreResult<IdentityOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
