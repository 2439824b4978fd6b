//! Hookgate Auth Core - Access gating for webhook instances
//!
//! Token authentication and session gating:
//! - per-tenant, per-instance key derivation ([`keys`])
//! - compact binary link tokens ([`compact`])
//! - HS256 session tokens ([`jwt`])
//! - header-based CSRF checks ([`csrf`])
//! - the gate tying them together with revocation ([`gate`])

pub mod compact;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod csrf;
pub mod error;
pub mod gate;
pub mod identity;
pub mod jwt;
pub mod keys;

pub use compact::{CompactReason, CompactToken, VerifiedCompact};
pub use config::GateConfig;
pub use cookie::{find_cookie, SessionCookie};
pub use crypto::{constant_time_eq, constant_time_str_eq, hmac_sha256};
pub use csrf::{CsrfPolicy, CsrfReason};
pub use error::{AuthError, CredentialFailure};
pub use gate::{
    AuthVerdict, DenyReason, ExchangeRejection, GateState, PasswordExchange, RequestCredentials,
    SessionClaims, SessionGate, SessionSubject,
};
pub use identity::{DisabledIdentityProvider, IdentityCredentials, IdentityOutcome, IdentityProvider};
pub use jwt::{Audience, JwtClaims, JwtReason};
pub use keys::{derive_legacy_key, derive_session_key, SigningKey};
