//! Hookgate Store - Collaborator abstractions
//!
//! Async interfaces for the two external reads the gate performs: the tenant
//! secret store and the webhook/instance record store. An in-memory
//! implementation backs tests and the fixture-driven service.
//!
//! # Example
//!
//! ```rust,ignore
//! use hookgate_store::{load_fixtures, RecordStore};
//!
//! let (records, secrets) = load_fixtures("fixtures.json")?;
//! let instance = records.get_instance(&instance_id).await?;
//! ```

pub mod error;
pub mod memory;
pub mod repo;

pub use error::{StoreError, StoreResult};
pub use memory::{load_fixtures, Fixtures, MemoryRecordStore, MemorySecretStore};
pub use repo::*;
