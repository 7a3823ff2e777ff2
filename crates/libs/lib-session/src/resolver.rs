//! # Identity Resolver
//!
//! Turns a bearer token into an [`AuthenticatedIdentity`], consulting the
//! identity cache before the persistent store.
//!
//! This is a read-through cache with write-on-miss population. Nothing
//! invalidates entries when an identity mutates, so a role/avatar/confirmation
//! change stays invisible to `resolve` until the entry expires, a consistency
//! tradeoff bounded by the configured cache TTL.
//!
//! Cache trouble of any kind (error or timeout) degrades to a miss: the cache
//! is an accelerator, never an authority. Only the store can fail a request,
//! and then as `Unavailable`, not `Unverified`.

use crate::bounded;
use lib_auth::token::{TokenCodec, TokenKind};
use lib_core::cache::IdentityCache;
use lib_core::{AuthError, AuthenticatedIdentity, Config, IdentityStore, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Resolves bearer tokens to authenticated identities.
pub struct IdentityResolver {
    store: Arc<dyn IdentityStore>,
    cache: Arc<dyn IdentityCache>,
    codec: TokenCodec,
    cache_ttl: Duration,
    dependency_timeout: Duration,
}

impl IdentityResolver {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        cache: Arc<dyn IdentityCache>,
        codec: TokenCodec,
        cache_ttl: Duration,
        dependency_timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            codec,
            cache_ttl,
            dependency_timeout,
        }
    }

    /// Build a resolver from configuration, constructing the token codec.
    pub fn from_config(
        store: Arc<dyn IdentityStore>,
        cache: Arc<dyn IdentityCache>,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let codec = TokenCodec::new(&config.jwt_secret, &config.jwt_algorithm)?;

        Ok(Self::new(
            store,
            cache,
            codec,
            Duration::from_secs(config.cache_ttl_secs),
            Duration::from_millis(config.dependency_timeout_ms),
        ))
    }

    /// Resolve a bearer token to the authenticated identity.
    ///
    /// Fails with `Unverified` when the token does not decode, is not an
    /// access token, or its subject is unknown; with `Unavailable` when the
    /// store cannot be reached.
    pub async fn resolve(&self, bearer_token: &str) -> Result<AuthenticatedIdentity> {
        let claims = self
            .codec
            .decode(bearer_token, TokenKind::Access)
            .map_err(|e| {
                // Expired vs forged vs wrong-kind stays in the logs only.
                debug!("[RESOLVE] access token rejected: {e}");
                AuthError::Unverified
            })?;
        let username = claims.sub;

        match tokio::time::timeout(self.dependency_timeout, self.cache.get(&username)).await {
            Ok(Ok(Some(snapshot))) => {
                debug!("[RESOLVE] cache hit for {username}");
                return Ok(snapshot);
            }
            Ok(Ok(None)) => debug!("[RESOLVE] cache miss for {username}"),
            Ok(Err(e)) => {
                warn!("[RESOLVE] cache lookup failed for {username}, treating as miss: {e}")
            }
            Err(_) => warn!("[RESOLVE] cache lookup for {username} timed out, treating as miss"),
        }

        let identity = bounded(
            self.dependency_timeout,
            "identity lookup",
            self.store.find_by_username(&username),
        )
        .await?
        .ok_or_else(|| {
            warn!("[RESOLVE] token subject {username} not found in store");
            AuthError::Unverified
        })?;

        let snapshot = AuthenticatedIdentity::from(&identity);

        match tokio::time::timeout(
            self.dependency_timeout,
            self.cache.put(&username, &snapshot, self.cache_ttl),
        )
        .await
        {
            Ok(Ok(())) => debug!("[RESOLVE] cached snapshot for {username}"),
            Ok(Err(e)) => warn!("[RESOLVE] cache population failed for {username}: {e}"),
            Err(_) => warn!("[RESOLVE] cache population for {username} timed out"),
        }

        Ok(snapshot)
    }
}

/// Gate for privileged operations: passes the identity through only when its
/// role is admin.
pub fn require_admin(identity: AuthenticatedIdentity) -> Result<AuthenticatedIdentity> {
    if !identity.is_admin() {
        warn!(
            "[RESOLVE] admin access denied for {} (role {})",
            identity.username, identity.role
        );
        return Err(AuthError::Forbidden);
    }

    Ok(identity)
}
