//! Header-based CSRF checks for state-changing entry points

use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Custom header that browsers will not attach cross-site without CORS
pub const CUSTOM_HEADER: &str = "x-requested-with";
/// Exact value the custom header must carry
pub const CUSTOM_HEADER_VALUE: &str = "XMLHttpRequest";

/// Why a request failed the CSRF check
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfReason {
    /// Neither `Origin` nor `Referer` present
    #[error("missing_origin")]
    MissingOrigin,
    /// Origin/Referer is not a URL
    #[error("invalid_origin")]
    InvalidOrigin,
    /// Origin is not on the allow-list
    #[error("origin_not_allowed")]
    OriginNotAllowed,
    /// Custom header absent or wrong
    #[error("missing_xrw")]
    MissingXrw,
}

impl CsrfReason {
    /// Wire/log code
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingOrigin => "missing_origin",
            Self::InvalidOrigin => "invalid_origin",
            Self::OriginNotAllowed => "origin_not_allowed",
            Self::MissingXrw => "missing_xrw",
        }
    }
}

/// CSRF policy; the default policy checks nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsrfPolicy {
    /// Allowed `scheme://host[:port]` prefixes; empty disables origin checks
    pub allowed_origin_prefixes: Vec<String>,
    /// Require `X-Requested-With: XMLHttpRequest`
    pub require_custom_header: bool,
}

impl CsrfPolicy {
    pub fn new(allowed_origin_prefixes: Vec<String>, require_custom_header: bool) -> Self {
        Self {
            allowed_origin_prefixes,
            require_custom_header,
        }
    }

    /// Whether any check is configured
    pub fn is_enabled(&self) -> bool {
        !self.allowed_origin_prefixes.is_empty() || self.require_custom_header
    }

    /// Validate request headers against this policy
    pub fn validate<I, K, V>(&self, headers: I) -> Result<(), CsrfReason>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        validate(
            headers,
            &self.allowed_origin_prefixes,
            self.require_custom_header,
        )
    }
}

/// Validate request headers.
///
/// Header names are matched case-insensitively. When a name repeats, the first
/// occurrence wins.
pub fn validate<I, K, V>(
    headers: I,
    allowed_origin_prefixes: &[String],
    require_custom_header: bool,
) -> Result<(), CsrfReason>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut normalized: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        normalized
            .entry(name.as_ref().to_ascii_lowercase())
            .or_insert_with(|| value.as_ref().to_string());
    }

    if !allowed_origin_prefixes.is_empty() {
        let present = |name: &str| {
            normalized
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let source = present("origin")
            .or_else(|| present("referer"))
            .ok_or(CsrfReason::MissingOrigin)?;

        let url = Url::parse(source).map_err(|_| CsrfReason::InvalidOrigin)?;
        let origin = origin_of(&url).ok_or(CsrfReason::InvalidOrigin)?;

        if !allowed_origin_prefixes
            .iter()
            .any(|prefix| origin_matches(&origin, prefix))
        {
            return Err(CsrfReason::OriginNotAllowed);
        }
    }

    if require_custom_header
        && normalized.get(CUSTOM_HEADER).map(String::as_str) != Some(CUSTOM_HEADER_VALUE)
    {
        return Err(CsrfReason::MissingXrw);
    }

    Ok(())
}

/// `scheme://host[:port]` of a URL; `None` for URLs without a host
fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Prefix match that stops at a host boundary, so `https://app.example.com`
/// does not admit `https://app.example.com.evil.net`.
fn origin_matches(origin: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    match origin.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(':'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["https://app.example.com".to_string()]
    }

    #[test]
    fn test_allowed_origin_with_path() {
        let headers = [("Origin", "https://app.example.com/path")];
        assert_eq!(validate(headers, &allowed(), false), Ok(()));
    }

    #[test]
    fn test_foreign_origin() {
        let headers = [("Origin", "https://evil.example.com")];
        assert_eq!(
            validate(headers, &allowed(), false),
            Err(CsrfReason::OriginNotAllowed)
        );
    }

    #[test]
    fn test_host_suffix_attack() {
        let headers = [("origin", "https://app.example.com.evil.net")];
        assert_eq!(
            validate(headers, &allowed(), false),
            Err(CsrfReason::OriginNotAllowed)
        );
    }

    #[test]
    fn test_scheme_must_match() {
        let headers = [("Origin", "http://app.example.com")];
        assert_eq!(
            validate(headers, &allowed(), false),
            Err(CsrfReason::OriginNotAllowed)
        );
    }

    #[test]
    fn test_explicit_port_allowed_by_host_prefix() {
        let headers = [("Origin", "https://app.example.com:8443")];
        assert_eq!(validate(headers, &allowed(), false), Ok(()));
    }

    #[test]
    fn test_referer_fallback_and_case() {
        let headers = [("REFERER", "https://app.example.com/i/I1?x=1")];
        assert_eq!(validate(headers, &allowed(), false), Ok(()));
    }

    #[test]
    fn test_origin_preferred_over_referer() {
        let headers = [
            ("Origin", "https://evil.example.com"),
            ("Referer", "https://app.example.com/"),
        ];
        assert_eq!(
            validate(headers, &allowed(), false),
            Err(CsrfReason::OriginNotAllowed)
        );
    }

    #[test]
    fn test_empty_origin_falls_back_to_referer() {
        let headers = [("Origin", "  "), ("Referer", "https://app.example.com/x")];
        assert_eq!(validate(headers, &allowed(), false), Ok(()));

        let headers = [("Origin", ""), ("Referer", "https://evil.example.com/")];
        assert_eq!(
            validate(headers, &allowed(), false),
            Err(CsrfReason::OriginNotAllowed)
        );
    }

    #[test]
    fn test_missing_origin() {
        let headers: [(&str, &str); 1] = [("Host", "app.example.com")];
        assert_eq!(
            validate(headers, &allowed(), false),
            Err(CsrfReason::MissingOrigin)
        );

        let blank = [("Origin", ""), ("Referer", " ")];
        assert_eq!(
            validate(blank, &allowed(), false),
            Err(CsrfReason::MissingOrigin)
        );
    }

    #[test]
    fn test_invalid_origin() {
        for bad in ["not a url", "null", "data:text/plain,hi"] {
            let headers = [("Origin", bad)];
            assert_eq!(
                validate(headers, &allowed(), false),
                Err(CsrfReason::InvalidOrigin),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_custom_header() {
        let ok = [("X-Requested-With", "XMLHttpRequest")];
        assert_eq!(validate(ok, &[], true), Ok(()));

        let wrong = [("X-Requested-With", "xmlhttprequest")];
        assert_eq!(validate(wrong, &[], true), Err(CsrfReason::MissingXrw));

        let none: [(&str, &str); 0] = [];
        assert_eq!(validate(none, &[], true), Err(CsrfReason::MissingXrw));
    }

    #[test]
    fn test_origin_checked_before_custom_header() {
        let headers = [("Origin", "https://evil.example.com")];
        assert_eq!(
            validate(headers, &allowed(), true),
            Err(CsrfReason::OriginNotAllowed)
        );
    }

    #[test]
    fn test_disabled_policy_accepts_anything() {
        let policy = CsrfPolicy::default();
        assert!(!policy.is_enabled());
        let none: [(&str, &str); 0] = [];
        assert_eq!(policy.validate(none), Ok(()));
    }
}
