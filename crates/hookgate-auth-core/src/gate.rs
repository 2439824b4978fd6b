//! Session gate - decides whether a request may see a webhook instance
//!
//! Credentials are considered in a fixed order:
//!
//! 1. `user` webhooks are delegated to the external identity provider.
//! 2. Unprotected webhooks are allowed.
//! 3. A `token` query parameter on an instance with legacy key material is
//!    verified as a compact link token. A bad link is denied outright; the
//!    gate does not fall back to the session cookie.
//! 4. A session cookie is verified as a session JWT bound to the instance and
//!    its current revocation counter.
//! 5. Otherwise the caller is challenged for the password.
//!
//! Nothing is cached between calls: the tenant secret and the revocation
//! counter are read fresh for every decision, so a counter bump takes effect
//! on the very next request.

use hookgate_store::{RecordStore, SecretStore};
use hookgate_types::{Instance, InstanceId, ProtectionMode, TenantSecret, Webhook};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::compact::{self, VerifiedCompact};
use crate::config::GateConfig;
use crate::cookie::SessionCookie;
use crate::crypto::constant_time_str_eq;
use crate::csrf::CsrfReason;
use crate::identity::{DisabledIdentityProvider, IdentityCredentials, IdentityOutcome, IdentityProvider};
use crate::jwt::{self, JwtClaims};
use crate::keys::{derive_legacy_key, derive_session_key, SigningKey};
use crate::{AuthError, CredentialFailure};

/// Application claims of a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSubject {
    /// Instance the session was minted for
    pub iid: String,
    /// Revocation counter at mint time
    pub tv: u32,
}

/// Full session token payload
pub type SessionClaims = JwtClaims<SessionSubject>;

/// Credentials found on an inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    /// `token` query parameter (legacy link)
    pub query_token: Option<String>,
    /// Session cookie for this instance
    pub session_cookie: Option<String>,
    /// Tokens issued by the external identity provider
    pub identity: IdentityCredentials,
}

/// Which branch of the gate a request falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Ungated,
    ExternalIdentityRequired,
    LegacyTokenPresent,
    SessionCookiePresent,
    NoCredential,
}

impl GateState {
    /// Classify a request. Order matters; see the module docs.
    pub fn classify(webhook: &Webhook, instance: &Instance, credentials: &RequestCredentials) -> Self {
        match webhook.protection {
            ProtectionMode::User => Self::ExternalIdentityRequired,
            ProtectionMode::None => Self::Ungated,
            ProtectionMode::Password => {
                if credentials.query_token.is_some() && instance.legacy_key_material().is_some() {
                    Self::LegacyTokenPresent
                } else if credentials.session_cookie.is_some() {
                    Self::SessionCookiePresent
                } else {
                    Self::NoCredential
                }
            }
        }
    }

    /// Stable label for logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ungated => "ungated",
            Self::ExternalIdentityRequired => "external_identity_required",
            Self::LegacyTokenPresent => "legacy_token_present",
            Self::SessionCookiePresent => "session_cookie_present",
            Self::NoCredential => "no_credential",
        }
    }
}

/// Public reason for a denial.
///
/// Wrong, expired and revoked credentials all surface as
/// [`DenyReason::InvalidCredential`]; the detail only goes to the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Identity provider knows the user but refuses access
    Unauthorized,
    /// Identity provider could not identify the user; show a login surface
    NotAuthenticated,
    /// A presented link or session was refused
    InvalidCredential,
    /// Nothing presented; challenge for the password
    PasswordRequired,
}

impl DenyReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotAuthenticated => "not_authenticated",
            Self::InvalidCredential => "invalid_credential",
            Self::PasswordRequired => "password_required",
        }
    }

    /// Whether the caller should present a password prompt
    pub fn is_challenge(self) -> bool {
        matches!(self, Self::InvalidCredential | Self::PasswordRequired)
    }
}

/// Gate decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthVerdict {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
    /// Fresh external credential to hand back to the client
    pub refreshed_credential: Option<String>,
}

impl AuthVerdict {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            refreshed_credential: None,
        }
    }

    pub fn allow_with(refreshed_credential: Option<String>) -> Self {
        Self {
            refreshed_credential,
            ..Self::allow()
        }
    }

    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            refreshed_credential: None,
        }
    }
}

/// Why a password exchange was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeRejection {
    /// Request failed the CSRF check
    Csrf(CsrfReason),
    /// Webhook is not in password mode
    NotPasswordProtected,
    /// Password missing, wrong, or none configured
    WrongPassword,
}

/// Result of a password exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordExchange {
    /// Password accepted; send this cookie
    Granted(SessionCookie),
    Rejected(ExchangeRejection),
}

/// Session gate
///
/// Collaborators are injected at construction; the gate holds no other state.
pub struct SessionGate<R, S, P = DisabledIdentityProvider>
where
    R: RecordStore,
    S: SecretStore,
    P: IdentityProvider,
{
    config: GateConfig,
    records: Arc<R>,
    secrets: Arc<S>,
    identity: Arc<P>,
}

impl<R, S, P> SessionGate<R, S, P>
where
    R: RecordStore,
    S: SecretStore,
    P: IdentityProvider,
{
    /// Create a new gate
    pub fn new(config: GateConfig, records: Arc<R>, secrets: Arc<S>, identity: Arc<P>) -> Self {
        Self {
            config,
            records,
            secrets,
            identity,
        }
    }

    /// Gate configuration
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Decide whether a request may see `instance_id`.
    ///
    /// # Errors
    /// [`AuthError::NotFound`] for unknown instances or webhooks and
    /// [`AuthError::ExternalUnavailable`] when a collaborator fails. A refused
    /// credential is never an error; it is a denying verdict.
    pub async fn authorize(
        &self,
        instance_id: &InstanceId,
        credentials: &RequestCredentials,
        now: i64,
    ) -> Result<AuthVerdict, AuthError> {
        let instance = self.records.get_instance(instance_id).await?;
        let webhook = self.records.get_webhook(&instance.webhook_id).await?;
        let state = GateState::classify(&webhook, &instance, credentials);

        tracing::debug!(
            instance_id = %instance.id,
            webhook_id = %webhook.id,
            state = state.as_str(),
            "Gate evaluating request"
        );

        match state {
            GateState::ExternalIdentityRequired => {
                self.authorize_external(&webhook, &credentials.identity).await
            }
            GateState::Ungated => Ok(AuthVerdict::allow()),
            GateState::LegacyTokenPresent => {
                let token = credentials.query_token.as_deref().unwrap_or_default();
                let material = instance.legacy_key_material().unwrap_or_default();
                let secret = self.tenant_secret(&webhook).await?;
                let key = derive_legacy_key(&secret, material)?;

                Ok(match self.verify_link_token(&key, &instance, token, now) {
                    Ok(_) => AuthVerdict::allow(),
                    Err(failure) => {
                        tracing::debug!(
                            instance_id = %instance.id,
                            failure = failure.as_str(),
                            "Link token refused"
                        );
                        AuthVerdict::deny(DenyReason::InvalidCredential)
                    }
                })
            }
            GateState::SessionCookiePresent => {
                let cookie = credentials.session_cookie.as_deref().unwrap_or_default();
                let secret = self.tenant_secret(&webhook).await?;
                let key = derive_session_key(&secret, &instance.id)?;

                Ok(match self.verify_session_token(&key, &instance, cookie, now) {
                    Ok(_) => AuthVerdict::allow(),
                    Err(failure) => {
                        tracing::debug!(
                            instance_id = %instance.id,
                            failure = failure.as_str(),
                            "Session cookie refused"
                        );
                        AuthVerdict::deny(DenyReason::InvalidCredential)
                    }
                })
            }
            GateState::NoCredential => Ok(AuthVerdict::deny(DenyReason::PasswordRequired)),
        }
    }

    /// Verify a legacy link token for `instance`
    pub fn verify_link_token(
        &self,
        key: &SigningKey,
        instance: &Instance,
        token: &str,
        now: i64,
    ) -> Result<VerifiedCompact, CredentialFailure> {
        compact::verify(token, key, &instance.id, instance.revocation_counter, now)
            .map_err(CredentialFailure::from)
    }

    /// Verify a session token for `instance`.
    ///
    /// A token with a valid signature is still refused with
    /// [`CredentialFailure::Revoked`] once the instance's revocation counter
    /// has moved past the value it was minted with.
    pub fn verify_session_token(
        &self,
        key: &SigningKey,
        instance: &Instance,
        token: &str,
        now: i64,
    ) -> Result<SessionClaims, CredentialFailure> {
        let audience = self.config.audience_for(&instance.id);
        let claims: SessionClaims = jwt::verify(
            token,
            key,
            Some(self.config.issuer.as_str()),
            Some(audience.as_str()),
            now,
            self.config.clock_skew.as_secs(),
        )?;

        if claims.custom.iid != instance.id.as_str() {
            return Err(CredentialFailure::ClaimMismatch);
        }
        if claims.custom.tv != instance.revocation_counter {
            return Err(CredentialFailure::Revoked);
        }

        Ok(claims)
    }

    /// Mint a session cookie for `instance` at its current revocation counter
    pub fn mint_session(
        &self,
        key: &SigningKey,
        instance: &Instance,
        now: i64,
    ) -> Result<SessionCookie, AuthError> {
        let ttl = self.config.session_ttl.as_secs();
        let subject = SessionSubject {
            iid: instance.id.to_string(),
            tv: instance.revocation_counter,
        };
        let audience = self.config.audience_for(&instance.id);
        let token = jwt::sign(key, subject, ttl, &self.config.issuer, Some(audience.as_str()), now)?;

        Ok(SessionCookie {
            name: self.config.cookie_name(&instance.id),
            value: token,
            path: self.config.cookie_path(&instance.id),
            domain: self.config.cookie_domain.clone(),
            max_age: ttl,
        })
    }

    /// Exchange a password for a session cookie.
    ///
    /// Runs the CSRF policy over `headers` first. Never changes any record.
    pub async fn exchange_password<I, K, V>(
        &self,
        instance_id: &InstanceId,
        password: &str,
        headers: I,
        now: i64,
    ) -> Result<PasswordExchange, AuthError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if let Err(reason) = self.config.csrf.validate(headers) {
            tracing::debug!(instance_id = %instance_id, reason = reason.as_str(), "CSRF check failed");
            return Ok(PasswordExchange::Rejected(ExchangeRejection::Csrf(reason)));
        }

        let instance = self.records.get_instance(instance_id).await?;
        let webhook = self.records.get_webhook(&instance.webhook_id).await?;

        if webhook.protection != ProtectionMode::Password {
            return Ok(PasswordExchange::Rejected(ExchangeRejection::NotPasswordProtected));
        }

        let matches = instance
            .password
            .as_deref()
            .filter(|expected| !expected.is_empty())
            .is_some_and(|expected| constant_time_str_eq(password, expected));
        if !matches {
            tracing::debug!(instance_id = %instance.id, "Password rejected");
            return Ok(PasswordExchange::Rejected(ExchangeRejection::WrongPassword));
        }

        let secret = self.tenant_secret(&webhook).await?;
        let key = derive_session_key(&secret, &instance.id)?;
        let cookie = self.mint_session(&key, &instance, now)?;

        tracing::info!(
            instance_id = %instance.id,
            revocation_counter = instance.revocation_counter,
            "Session issued"
        );
        Ok(PasswordExchange::Granted(cookie))
    }

    /// Issue a legacy link token for an instance with legacy key material.
    ///
    /// `ttl` defaults to the configured link lifetime; a zero TTL never expires.
    pub async fn issue_link_token(
        &self,
        instance_id: &InstanceId,
        ttl: Option<Duration>,
        now: i64,
    ) -> Result<String, AuthError> {
        let instance = self.records.get_instance(instance_id).await?;
        let material = instance
            .legacy_key_material()
            .ok_or(AuthError::InvalidInput("instance has no legacy key material"))?;
        let webhook = self.records.get_webhook(&instance.webhook_id).await?;

        let issued_at =
            u32::try_from(now).map_err(|_| AuthError::InvalidInput("issue time out of range"))?;
        let ttl_seconds = u32::try_from(ttl.unwrap_or(self.config.link_ttl).as_secs())
            .map_err(|_| AuthError::InvalidInput("link ttl out of range"))?;

        let secret = self.tenant_secret(&webhook).await?;
        let key = derive_legacy_key(&secret, material)?;

        Ok(compact::encode(
            &key,
            &instance.id,
            instance.revocation_counter,
            issued_at,
            ttl_seconds,
        ))
    }

    async fn authorize_external(
        &self,
        webhook: &Webhook,
        credentials: &IdentityCredentials,
    ) -> Result<AuthVerdict, AuthError> {
        let outcome = self
            .identity
            .authenticate(credentials, webhook)
            .await
            .map_err(|e| {
                tracing::error!(webhook_id = %webhook.id, error = %e, "Identity provider failed");
                AuthError::ExternalUnavailable(e.to_string())
            })?;

        Ok(match outcome {
            IdentityOutcome::Authorized {
                subject,
                refreshed_credential,
            } => {
                tracing::debug!(webhook_id = %webhook.id, subject = %subject, "External identity authorized");
                AuthVerdict::allow_with(refreshed_credential)
            }
            IdentityOutcome::Unauthorized { subject } => {
                tracing::debug!(webhook_id = %webhook.id, subject = %subject, "External identity not authorized");
                AuthVerdict::deny(DenyReason::Unauthorized)
            }
            IdentityOutcome::NotAuthenticated => AuthVerdict::deny(DenyReason::NotAuthenticated),
        })
    }

    async fn tenant_secret(&self, webhook: &Webhook) -> Result<TenantSecret, AuthError> {
        self.secrets.get_secret(&webhook.tenant_id).await.map_err(|e| {
            tracing::error!(tenant_id = %webhook.tenant_id, error = %e, "Failed to fetch tenant secret");
            AuthError::ExternalUnavailable(e.to_string())
        })
    }
}

impl<R, S, P> std::fmt::Debug for SessionGate<R, S, P>
where
    R: RecordStore,
    S: SecretStore,
    P: IdentityProvider,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
