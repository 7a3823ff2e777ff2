//! # Session Manager
//!
//! Issues and rotates access/refresh token pairs and drives the
//! email-confirmation flow.
//!
//! Every successful login or refresh overwrites the identity's stored refresh
//! token with the newly minted one. That overwrite is the sole mechanism that
//! retires a leaked refresh token: a superseded token remains cryptographically
//! valid until it expires, but the stored-value check rejects it. There is no
//! explicit logout; revocation happens by rotation or by an administrator
//! clearing the stored token.

use crate::bounded;
use lib_auth::pwd::verify_password;
use lib_auth::token::{TokenCodec, TokenError, TokenKind};
use lib_core::dto::TokenPair;
use lib_core::{AuthError, Config, IdentityStore, Result};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

/// Outcome of consuming an email-confirmation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    AlreadyConfirmed,
}

/// Login, refresh, and confirmation flows over the persistent store.
pub struct SessionManager {
    store: Arc<dyn IdentityStore>,
    codec: TokenCodec,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
    dependency_timeout: StdDuration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        codec: TokenCodec,
        access_ttl: chrono::Duration,
        refresh_ttl: chrono::Duration,
        dependency_timeout: StdDuration,
    ) -> Self {
        Self {
            store,
            codec,
            access_ttl,
            refresh_ttl,
            dependency_timeout,
        }
    }

    /// Build a session manager from configuration, constructing the token
    /// codec.
    pub fn from_config(store: Arc<dyn IdentityStore>, config: &Config) -> anyhow::Result<Self> {
        let codec = TokenCodec::new(&config.jwt_secret, &config.jwt_algorithm)?;

        Ok(Self::new(
            store,
            codec,
            chrono::Duration::seconds(config.access_token_ttl_secs),
            chrono::Duration::seconds(config.refresh_token_ttl_secs),
            StdDuration::from_millis(config.dependency_timeout_ms),
        ))
    }

    /// Authenticate with username and password, minting a fresh token pair.
    ///
    /// Unknown user and wrong password are indistinguishable to the caller.
    /// A verified password against an unconfirmed identity is `NotConfirmed`.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let identity = bounded(
            self.dependency_timeout,
            "identity lookup",
            self.store.find_by_username(username),
        )
        .await?
        .ok_or_else(|| {
            warn!("[LOGIN] unknown username {username}");
            AuthError::InvalidCredentials
        })?;

        // Argon2 verification is CPU-bound by design; keep it off the
        // async scheduler.
        let password = password.to_owned();
        let password_hash = identity.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || {
            verify_password(&password, &password_hash)
        })
        .await
        .map_err(|e| AuthError::Unavailable(format!("password verification task failed: {e}")))?
        .map_err(|e| {
            warn!("[LOGIN] stored hash for {username} is unusable: {e}");
            AuthError::Unavailable("stored credential is unusable".to_string())
        })?;

        if !verified {
            warn!("[LOGIN] password verification failed for {username}");
            return Err(AuthError::InvalidCredentials);
        }

        if !identity.confirmed {
            warn!("[LOGIN] unconfirmed identity {username}");
            return Err(AuthError::NotConfirmed);
        }

        let pair = self.mint_pair(&identity.username)?;

        bounded(
            self.dependency_timeout,
            "refresh token update",
            self.store
                .update_refresh_token(identity.id, Some(&pair.refresh_token)),
        )
        .await?;

        info!("[LOGIN] session established for {username}");
        Ok(pair)
    }

    /// Exchange a refresh token for a fresh pair, rotating the stored token.
    ///
    /// Rejects the exchange when the token does not decode as a refresh
    /// token, its subject is unknown, or the presented string no longer
    /// matches the stored one (supersession).
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self
            .codec
            .decode(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                debug!("[REFRESH] refresh token rejected: {e}");
                AuthError::InvalidRefreshToken
            })?;
        let username = claims.sub;

        let identity = bounded(
            self.dependency_timeout,
            "identity lookup",
            self.store.find_by_username(&username),
        )
        .await?
        .ok_or_else(|| {
            warn!("[REFRESH] token subject {username} not found in store");
            AuthError::InvalidRefreshToken
        })?;

        if identity.refresh_token.as_deref() != Some(refresh_token) {
            warn!("[REFRESH] superseded refresh token presented for {username}");
            return Err(AuthError::InvalidRefreshToken);
        }

        let pair = self.mint_pair(&username)?;

        let rotated = bounded(
            self.dependency_timeout,
            "refresh token rotation",
            self.store
                .rotate_refresh_token(identity.id, refresh_token, &pair.refresh_token),
        )
        .await?;

        if !rotated {
            warn!("[REFRESH] lost rotation race for {username}");
            return Err(AuthError::InvalidRefreshToken);
        }

        info!("[REFRESH] session rotated for {username}");
        Ok(pair)
    }

    /// Issue an email-confirmation token for `email` (fixed 7-day validity).
    pub fn issue_confirmation_token(&self, email: &str) -> Result<String> {
        self.codec
            .encode_email_token(email)
            .map_err(mint_failure)
    }

    /// Consume an email-confirmation token, marking the identity confirmed.
    pub async fn confirm_email(&self, token: &str) -> Result<ConfirmOutcome> {
        let claims = self
            .codec
            .decode(token, TokenKind::EmailConfirmation)
            .map_err(|e| {
                debug!("[CONFIRM] confirmation token rejected: {e}");
                AuthError::Unverified
            })?;
        let email = claims.sub;

        let identity = bounded(
            self.dependency_timeout,
            "identity lookup",
            self.store.find_by_email(&email),
        )
        .await?
        .ok_or(AuthError::NotFound)?;

        if identity.confirmed {
            debug!("[CONFIRM] {email} is already confirmed");
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }

        bounded(
            self.dependency_timeout,
            "confirmation update",
            self.store.update_confirmed(&email),
        )
        .await?;

        info!("[CONFIRM] email confirmed for {email}");
        Ok(ConfirmOutcome::Confirmed)
    }

    fn mint_pair(&self, username: &str) -> Result<TokenPair> {
        let access = self
            .codec
            .encode(username, TokenKind::Access, self.access_ttl)
            .map_err(mint_failure)?;
        let refresh = self
            .codec
            .encode(username, TokenKind::Refresh, self.refresh_ttl)
            .map_err(mint_failure)?;

        Ok(TokenPair::bearer(access, refresh))
    }
}

fn mint_failure(err: TokenError) -> AuthError {
    AuthError::Unavailable(format!("token minting failed: {err}"))
}
