//! Hookgate Types - Shared domain types
//!
//! This crate contains domain types used across hookgate crates:
//! - Tenant, webhook and instance identifiers
//! - Webhook and instance records as read from the record store
//! - The tenant secret wrapper

pub mod ids;
pub mod record;
pub mod error;

pub use ids::*;
pub use record::*;
pub use error::*;
