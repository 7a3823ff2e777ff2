//! Redis identity cache
//!
//! Stores [`AuthenticatedIdentity`] snapshots as JSON under the username, with
//! expiry set atomically via `SET .. EX`. Uses a multiplexed async connection
//! so concurrent resolvers share one socket.

use super::{CacheError, IdentityCache};
use crate::model::store::models::AuthenticatedIdentity;
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::time::Duration;

/// Redis-backed identity cache.
#[derive(Clone)]
pub struct RedisIdentityCache {
    client: Client,
}

impl RedisIdentityCache {
    /// Create a cache client from a connection URL
    /// (e.g., `redis://localhost:6379`).
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Backend(format!("failed to create redis client: {e}")))?;

        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(format!("failed to get redis connection: {e}")))
    }
}

#[async_trait]
impl IdentityCache for RedisIdentityCache {
    async fn get(&self, username: &str) -> Result<Option<AuthenticatedIdentity>, CacheError> {
        let mut conn = self.connection().await?;

        let payload: Option<String> = conn
            .get(username)
            .await
            .map_err(|e| CacheError::Backend(format!("redis GET failed: {e}")))?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        username: &str,
        snapshot: &AuthenticatedIdentity,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(snapshot)?;

        conn.set_ex::<_, _, ()>(username, payload, ttl.as_secs())
            .await
            .map_err(|e| CacheError::Backend(format!("redis SET failed: {e}")))?;

        Ok(())
    }
}
