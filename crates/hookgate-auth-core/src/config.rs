//! Configuration types for the gate

use hookgate_types::InstanceId;
use std::time::Duration;

use crate::csrf::CsrfPolicy;

/// Gate configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// `iss` of minted session tokens (also the expected issuer)
    pub issuer: String,
    /// Session audience is `"<audience_prefix>:<instance id>"`
    pub audience_prefix: String,
    /// Session cookie name is `<cookie_prefix><instance id>`
    pub cookie_prefix: String,
    /// Instance routes live under `<route_prefix>/<instance id>`
    pub route_prefix: String,
    /// Cookie `Domain` attribute, if any
    pub cookie_domain: Option<String>,
    /// Session token (and cookie) lifetime
    pub session_ttl: Duration,
    /// Tolerated clock difference when checking `nbf`/`exp`
    pub clock_skew: Duration,
    /// Lifetime of newly issued legacy links
    pub link_ttl: Duration,
    /// CSRF policy for POST entry points
    pub csrf: CsrfPolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            issuer: "tgl".to_string(),
            audience_prefix: "wi".to_string(),
            cookie_prefix: "hg_sess_".to_string(),
            route_prefix: "/i".to_string(),
            cookie_domain: None,
            session_ttl: Duration::from_secs(12 * 60 * 60), // 12 hours
            clock_skew: Duration::from_secs(30),
            link_ttl: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
            csrf: CsrfPolicy::default(),
        }
    }
}

impl GateConfig {
    /// Create a config with default names and lifetimes
    pub fn new() -> Self {
        Self::default()
    }

    /// Audience bound to an instance
    pub fn audience_for(&self, instance_id: &InstanceId) -> String {
        format!("{}:{}", self.audience_prefix, instance_id)
    }

    /// Session cookie name for an instance
    pub fn cookie_name(&self, instance_id: &InstanceId) -> String {
        format!("{}{}", self.cookie_prefix, instance_id)
    }

    /// Cookie path scoped to an instance's routes
    pub fn cookie_path(&self, instance_id: &InstanceId) -> String {
        format!("{}/{}", self.route_prefix.trim_end_matches('/'), instance_id)
    }

    /// Set issuer
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set audience prefix
    pub fn with_audience_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.audience_prefix = prefix.into();
        self
    }

    /// Set cookie domain
    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    /// Set session duration
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set clock skew
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Set legacy link lifetime
    pub fn with_link_ttl(mut self, ttl: Duration) -> Self {
        self.link_ttl = ttl;
        self
    }

    /// Set CSRF policy
    pub fn with_csrf(mut self, csrf: CsrfPolicy) -> Self {
        self.csrf = csrf;
        self
    }
}
