//! Minimal HS256 JSON Web Tokens
//!
//! Only one profile is supported: header `{"alg":"HS256","typ":"JWT"}`,
//! HMAC-SHA256 signature, unpadded base64url segments. There is no algorithm
//! negotiation; any other header is refused before the signature is looked at.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::crypto::constant_time_eq;
use crate::keys::SigningKey;
use crate::AuthError;

/// The only accepted `alg`
pub const JWT_ALG: &str = "HS256";
/// The only accepted `typ`
pub const JWT_TYP: &str = "JWT";

/// Why a token was refused, in check order
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtReason {
    /// Not three dot-separated segments
    #[error("format")]
    Format,
    /// Header is not exactly HS256/JWT
    #[error("header")]
    Header,
    /// Signature mismatch
    #[error("sig")]
    Sig,
    /// Issuer mismatch
    #[error("iss")]
    Iss,
    /// Audience mismatch
    #[error("aud")]
    Aud,
    /// Not yet valid
    #[error("nbf")]
    Nbf,
    /// Expired
    #[error("exp")]
    Exp,
    /// Malformed base64 or JSON
    #[error("parse")]
    Parse,
}

impl JwtReason {
    /// Wire/log code
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Header => "header",
            Self::Sig => "sig",
            Self::Iss => "iss",
            Self::Aud => "aud",
            Self::Nbf => "nbf",
            Self::Exp => "exp",
            Self::Parse => "parse",
        }
    }
}

#[derive(Debug, Serialize)]
struct Header {
    alg: &'static str,
    typ: &'static str,
}

/// Whether a decoded header is a JSON object with exactly the accepted
/// `alg`/`typ` strings
fn is_accepted_header(header: &Value) -> bool {
    let Some(fields) = header.as_object() else {
        return false;
    };
    fields.get("alg").and_then(Value::as_str) == Some(JWT_ALG)
        && fields.get("typ").and_then(Value::as_str) == Some(JWT_TYP)
}

/// `aud` claim: a single string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    /// Whether `expected` is (one of) the audience(s)
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Self::One(aud) => aud == expected,
            Self::Many(auds) => auds.iter().any(|a| a == expected),
        }
    }
}

/// Token payload: registered claims plus an application-defined record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims<T> {
    /// Application claims, flattened into the payload object
    #[serde(flatten)]
    pub custom: T,
    /// Issued at (unix seconds); informational, never checked
    #[serde(
        default,
        deserialize_with = "numeric_claim",
        skip_serializing_if = "Option::is_none"
    )]
    pub iat: Option<i64>,
    /// Expiry (unix seconds); ignored unless numeric
    #[serde(
        default,
        deserialize_with = "numeric_claim",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<i64>,
    /// Not before (unix seconds); ignored unless numeric
    #[serde(
        default,
        deserialize_with = "numeric_claim",
        skip_serializing_if = "Option::is_none"
    )]
    pub nbf: Option<i64>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
}

/// Time claim that only counts when it is a JSON number. Fractional seconds
/// are truncated toward negative infinity.
fn numeric_claim<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs.floor() as i64)))
}

/// Sign `claims` into a compact JWT.
///
/// `exp` is set to `issued_at + ttl_seconds` when `ttl_seconds > 0`.
pub fn sign<T: Serialize>(
    key: &SigningKey,
    claims: T,
    ttl_seconds: u64,
    issuer: &str,
    audience: Option<&str>,
    issued_at: i64,
) -> Result<String, AuthError> {
    let ttl = i64::try_from(ttl_seconds).map_err(|_| AuthError::InvalidInput("ttl out of range"))?;
    let payload = JwtClaims {
        custom: claims,
        iat: Some(issued_at),
        exp: (ttl > 0).then(|| issued_at.saturating_add(ttl)),
        nbf: None,
        iss: Some(issuer.to_string()),
        aud: audience.map(|a| Audience::One(a.to_string())),
    };
    let header = Header {
        alg: JWT_ALG,
        typ: JWT_TYP,
    };

    let header_json = serde_json::to_vec(&header).map_err(|e| {
        tracing::error!("Failed to serialize JWT header: {}", e);
        AuthError::Internal("Failed to sign token".to_string())
    })?;
    let payload_json = serde_json::to_vec(&payload).map_err(|e| {
        tracing::error!("Failed to serialize JWT payload: {}", e);
        AuthError::Internal("Failed to sign token".to_string())
    })?;

    let header_b64 = URL_SAFE_NO_PAD.encode(header_json);
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json);
    let signature = compute_signature(key, &header_b64, &payload_b64);

    Ok(format!(
        "{header_b64}.{payload_b64}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verify a compact JWT and return its claims.
///
/// `issuer` and `audience` are only checked when given. `clock_skew_seconds`
/// widens both the `nbf` and the `exp` window.
pub fn verify<T: DeserializeOwned>(
    token: &str,
    key: &SigningKey,
    issuer: Option<&str>,
    audience: Option<&str>,
    now: i64,
    clock_skew_seconds: u64,
) -> Result<JwtClaims<T>, JwtReason> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header_b64, payload_b64, signature_b64] = segments.as_slice() else {
        return Err(JwtReason::Format);
    };

    let header: Value = decode_json(header_b64)?;
    if !is_accepted_header(&header) {
        return Err(JwtReason::Header);
    }

    let expected = compute_signature(key, header_b64, payload_b64);
    let provided = decode_segment(signature_b64)?;
    if !constant_time_eq(&expected, &provided) {
        return Err(JwtReason::Sig);
    }

    let claims: JwtClaims<T> = decode_json(payload_b64)?;

    if let Some(expected_iss) = issuer {
        if claims.iss.as_deref() != Some(expected_iss) {
            return Err(JwtReason::Iss);
        }
    }

    if let Some(expected_aud) = audience {
        if !claims.aud.as_ref().is_some_and(|aud| aud.contains(expected_aud)) {
            return Err(JwtReason::Aud);
        }
    }

    let skew = i64::try_from(clock_skew_seconds).unwrap_or(i64::MAX);
    if let Some(nbf) = claims.nbf {
        if now.saturating_add(skew) < nbf {
            return Err(JwtReason::Nbf);
        }
    }
    if let Some(exp) = claims.exp {
        if now.saturating_sub(skew) >= exp {
            return Err(JwtReason::Exp);
        }
    }

    Ok(claims)
}

fn compute_signature(key: &SigningKey, header_b64: &str, payload_b64: &str) -> [u8; 32] {
    key.mac(&[header_b64.as_bytes(), b".", payload_b64.as_bytes()])
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, JwtReason> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| JwtReason::Parse)
}

fn decode_json<T: DeserializeOwned>(segment: &str) -> Result<T, JwtReason> {
    let bytes = decode_segment(segment)?;
    serde_json::from_slice(&bytes).map_err(|_| JwtReason::Parse)
}
