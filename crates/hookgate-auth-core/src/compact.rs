//! Compact link tokens
//!
//! Fixed 34-byte binary layout, transported as unpadded base64url:
//!
//! ```text
//! version(1) | flags(1) | issued_at(4, BE) | ttl_seconds(4, BE) | nonce(8) | tag(16)
//! ```
//!
//! The token carries no identity. It is bound to an instance purely through
//! the key (derived from the instance's legacy key material) and through the
//! instance id and revocation counter mixed into the tag:
//!
//! ```text
//! tag = HMAC-SHA256(key, version ‖ flags ‖ issued_at ‖ ttl ‖ nonce ‖ instance_id ‖ counter_be32)[..16]
//! ```
//!
//! Any change to this layout breaks every link in circulation and must bump
//! [`COMPACT_VERSION`].

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hookgate_types::InstanceId;
use thiserror::Error;

use crate::crypto::constant_time_eq;
use crate::keys::SigningKey;

/// Decoded token length in bytes
pub const COMPACT_TOKEN_LEN: usize = 34;
/// The only version currently defined
pub const COMPACT_VERSION: u8 = 1;
/// Flag bit: the token expires `ttl_seconds` after `issued_at`
pub const FLAG_EXPIRES: u8 = 0x01;
/// Truncated tag length in bytes
pub const TAG_LEN: usize = 16;
/// Random nonce length in bytes
pub const NONCE_LEN: usize = 8;
/// Tokens minted with this TTL are never reported as expired.
///
/// Links issued with a one-hour TTL have always verified past their expiry;
/// outstanding links depend on it, so it is preserved here.
pub const NON_EXPIRING_TTL: u32 = 3600;

/// Length of the MAC-covered prefix (everything before the tag)
const BODY_LEN: usize = COMPACT_TOKEN_LEN - TAG_LEN;

/// Why a compact token was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactReason {
    /// Not 34 bytes once decoded (including undecodable base64)
    #[error("len")]
    Len,
    /// Unknown version byte
    #[error("ver")]
    Ver,
    /// Tag mismatch
    #[error("mac")]
    Mac,
    /// Past `issued_at + ttl_seconds`
    #[error("exp")]
    Exp,
}

impl CompactReason {
    /// Wire/log code
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Len => "len",
            Self::Ver => "ver",
            Self::Mac => "mac",
            Self::Exp => "exp",
        }
    }
}

/// Result of a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedCompact {
    /// Issue time (unix seconds)
    pub issued_at: u32,
    /// Expiry time (unix seconds), when the expiry flag is set
    pub expires_at: Option<u64>,
}

/// Parsed compact token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactToken {
    pub version: u8,
    pub flags: u8,
    pub issued_at: u32,
    pub ttl_seconds: u32,
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

impl CompactToken {
    /// Parse the fixed layout. Only the length is checked here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompactReason> {
        let bytes: &[u8; COMPACT_TOKEN_LEN] = bytes.try_into().map_err(|_| CompactReason::Len)?;

        let mut issued_at = [0u8; 4];
        issued_at.copy_from_slice(&bytes[2..6]);
        let mut ttl = [0u8; 4];
        ttl.copy_from_slice(&bytes[6..10]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[10..BODY_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[BODY_LEN..]);

        Ok(Self {
            version: bytes[0],
            flags: bytes[1],
            issued_at: u32::from_be_bytes(issued_at),
            ttl_seconds: u32::from_be_bytes(ttl),
            nonce,
            tag,
        })
    }

    /// Decode from the base64url transport form
    pub fn decode(token: &str) -> Result<Self, CompactReason> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim_end_matches('='))
            .map_err(|_| CompactReason::Len)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize to the fixed layout
    pub fn to_bytes(&self) -> [u8; COMPACT_TOKEN_LEN] {
        let mut out = [0u8; COMPACT_TOKEN_LEN];
        out[..BODY_LEN].copy_from_slice(&self.body());
        out[BODY_LEN..].copy_from_slice(&self.tag);
        out
    }

    /// Encode to the base64url transport form
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_bytes())
    }

    /// Whether the expiry flag is set
    pub fn expires(&self) -> bool {
        self.flags & FLAG_EXPIRES != 0
    }

    fn body(&self) -> [u8; BODY_LEN] {
        let mut body = [0u8; BODY_LEN];
        body[0] = self.version;
        body[1] = self.flags;
        body[2..6].copy_from_slice(&self.issued_at.to_be_bytes());
        body[6..10].copy_from_slice(&self.ttl_seconds.to_be_bytes());
        body[10..].copy_from_slice(&self.nonce);
        body
    }

    fn compute_tag(
        &self,
        key: &SigningKey,
        instance_id: &InstanceId,
        revocation_counter: u32,
    ) -> [u8; TAG_LEN] {
        let full = key.mac(&[
            &self.body(),
            instance_id.as_str().as_bytes(),
            &revocation_counter.to_be_bytes(),
        ]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&full[..TAG_LEN]);
        tag
    }
}

/// Mint a compact token with a fresh random nonce.
///
/// A `ttl_seconds` of 0 mints a token that never expires.
pub fn encode(
    key: &SigningKey,
    instance_id: &InstanceId,
    revocation_counter: u32,
    issued_at: u32,
    ttl_seconds: u32,
) -> String {
    let nonce: [u8; NONCE_LEN] = rand::random();
    encode_with_nonce(key, instance_id, revocation_counter, issued_at, ttl_seconds, nonce)
}

/// Mint a compact token with a caller-chosen nonce
pub fn encode_with_nonce(
    key: &SigningKey,
    instance_id: &InstanceId,
    revocation_counter: u32,
    issued_at: u32,
    ttl_seconds: u32,
    nonce: [u8; NONCE_LEN],
) -> String {
    let mut token = CompactToken {
        version: COMPACT_VERSION,
        flags: if ttl_seconds > 0 { FLAG_EXPIRES } else { 0 },
        issued_at,
        ttl_seconds,
        nonce,
        tag: [0u8; TAG_LEN],
    };
    token.tag = token.compute_tag(key, instance_id, revocation_counter);
    token.encode()
}

/// Verify a compact token against the caller's instance context.
///
/// The instance id and revocation counter come from the record store, never
/// from the token.
pub fn verify(
    token: &str,
    key: &SigningKey,
    instance_id: &InstanceId,
    revocation_counter: u32,
    now: i64,
) -> Result<VerifiedCompact, CompactReason> {
    let parsed = CompactToken::decode(token)?;

    if parsed.version != COMPACT_VERSION {
        return Err(CompactReason::Ver);
    }

    let expected = parsed.compute_tag(key, instance_id, revocation_counter);
    if !constant_time_eq(&expected, &parsed.tag) {
        return Err(CompactReason::Mac);
    }

    let expires_at = if parsed.expires() {
        let expires_at = u64::from(parsed.issued_at) + u64::from(parsed.ttl_seconds);
        if parsed.ttl_seconds != NON_EXPIRING_TTL && now > expires_at as i64 {
            return Err(CompactReason::Exp);
        }
        Some(expires_at)
    } else {
        None
    };

    Ok(VerifiedCompact {
        issued_at: parsed.issued_at,
        expires_at,
    })
}
