//! # Identity Cache
//!
//! Short-TTL key-value cache of identity snapshots, keyed by username.
//!
//! The cache is a pure accelerator. Absence never blocks authentication, and
//! callers must treat any [`CacheError`] as a miss (fail open to the store),
//! never as an authentication failure. Entries are never invalidated on
//! identity mutation; staleness is bounded by the configured TTL.

// region: --- Modules
pub mod redis;
// endregion: --- Modules

// region: --- Re-exports
pub use redis::RedisIdentityCache;
// endregion: --- Re-exports

use crate::model::store::models::AuthenticatedIdentity;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from the cache layer. Callers degrade these to misses.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cached snapshot is malformed: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Cache of identity snapshots keyed by username.
#[async_trait]
pub trait IdentityCache: Send + Sync {
    async fn get(&self, username: &str) -> Result<Option<AuthenticatedIdentity>, CacheError>;

    async fn put(
        &self,
        username: &str,
        snapshot: &AuthenticatedIdentity,
        ttl: Duration,
    ) -> Result<(), CacheError>;
}
