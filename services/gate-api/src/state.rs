//! Application state

use std::sync::Arc;

use hookgate_auth_core::SessionGate;
use hookgate_store::{MemoryRecordStore, MemorySecretStore};

use crate::config::Config;

/// Gate with the concrete store types
pub type GateImpl = SessionGate<MemoryRecordStore, MemorySecretStore>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session gate
    pub gate: Arc<GateImpl>,
    /// Record store (shared with the gate, for readiness checks)
    pub records: Arc<MemoryRecordStore>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the gate to the stores
    pub fn new(records: MemoryRecordStore, secrets: MemorySecretStore, config: Config) -> Self {
        let records = Arc::new(records);
        let gate = SessionGate::new(
            config.gate.clone(),
            Arc::clone(&records),
            Arc::new(secrets),
            Arc::new(hookgate_auth_core::DisabledIdentityProvider),
        );
        Self {
            gate: Arc::new(gate),
            records,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}
