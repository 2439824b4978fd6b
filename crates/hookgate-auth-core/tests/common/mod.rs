//! Common test utilities for hookgate-auth-core integration tests

pub mod fakes;

#[allow(unused_imports)]
pub use fakes::{
    gate, gate_with_identity, world, FailingSecretStore, StubIdentityProvider, TestWorld,
    TENANT_SECRET,
};
