//! Configuration for the gate API service.

use hookgate_auth_core::{CsrfPolicy, GateConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Gate API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// JSON fixture file seeding the in-memory stores
    pub fixtures_path: PathBuf,

    /// Gate configuration
    pub gate: GateConfig,

    /// Request timeout
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fixtures_path = lookup("HOOKGATE_FIXTURES")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("HOOKGATE_FIXTURES"))?;

        let http_port = lookup("HTTP_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Session lifetime (default 12 hours)
        let session_ttl_secs: u64 = lookup("SESSION_TTL_SECS")
            .unwrap_or_else(|| "43200".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SESSION_TTL_SECS"))?;
        if session_ttl_secs == 0 {
            return Err(ConfigError::Invalid("SESSION_TTL_SECS must be positive"));
        }

        let clock_skew_secs: u64 = lookup("CLOCK_SKEW_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("CLOCK_SKEW_SECS"))?;

        // Lifetime of issued legacy links (default 7 days)
        let link_ttl_secs: u64 = lookup("LINK_TTL_SECS")
            .unwrap_or_else(|| "604800".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("LINK_TTL_SECS"))?;
        if link_ttl_secs == 0 {
            return Err(ConfigError::Invalid("LINK_TTL_SECS must be positive"));
        }

        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // CSRF
        let allowed_origins: Vec<String> = lookup("CSRF_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        let require_xrw = lookup("CSRF_REQUIRE_XRW")
            .map(|v| v.parse::<bool>())
            .transpose()
            .map_err(|_| ConfigError::Invalid("CSRF_REQUIRE_XRW"))?
            .unwrap_or(false);

        let mut gate = GateConfig::new()
            .with_session_ttl(Duration::from_secs(session_ttl_secs))
            .with_clock_skew(Duration::from_secs(clock_skew_secs))
            .with_link_ttl(Duration::from_secs(link_ttl_secs))
            .with_csrf(CsrfPolicy::new(allowed_origins, require_xrw));
        if let Some(domain) = lookup("COOKIE_DOMAIN").filter(|d| !d.trim().is_empty()) {
            gate = gate.with_cookie_domain(domain);
        }

        Ok(Self {
            http_port,
            fixtures_path,
            gate,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("HOOKGATE_FIXTURES", "fixtures.json")])).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.fixtures_path, PathBuf::from("fixtures.json"));
        assert_eq!(config.gate.session_ttl, Duration::from_secs(12 * 3600));
        assert_eq!(config.gate.clock_skew, Duration::from_secs(30));
        assert_eq!(config.gate.link_ttl, Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.gate.cookie_domain, None);
        assert!(!config.gate.csrf.is_enabled());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_fixtures_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("HOOKGATE_FIXTURES")));
    }

    #[test]
    fn test_csrf_and_cookie_settings() {
        let config = Config::from_lookup(lookup(&[
            ("HOOKGATE_FIXTURES", "fixtures.json"),
            ("CSRF_ALLOWED_ORIGINS", "https://a.example.com, https://b.example.com,"),
            ("CSRF_REQUIRE_XRW", "true"),
            ("COOKIE_DOMAIN", "hooks.example.com"),
        ]))
        .unwrap();
        assert_eq!(
            config.gate.csrf.allowed_origin_prefixes,
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert!(config.gate.csrf.require_custom_header);
        assert_eq!(config.gate.cookie_domain.as_deref(), Some("hooks.example.com"));
    }

    #[test]
    fn test_link_ttl_setting() {
        let config = Config::from_lookup(lookup(&[
            ("HOOKGATE_FIXTURES", "fixtures.json"),
            ("LINK_TTL_SECS", "3600"),
        ]))
        .unwrap();
        assert_eq!(config.gate.link_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("HTTP_PORT", "eighty"),
            ("SESSION_TTL_SECS", "0"),
            ("CLOCK_SKEW_SECS", "-1"),
            ("LINK_TTL_SECS", "0"),
            ("LINK_TTL_SECS", "week"),
            ("CSRF_REQUIRE_XRW", "yes"),
        ] {
            let result = Config::from_lookup(lookup(&[("HOOKGATE_FIXTURES", "f.json"), (key, value)]));
            assert!(matches!(result, Err(ConfigError::Invalid(_))), "{key}={value}");
        }
    }
}
