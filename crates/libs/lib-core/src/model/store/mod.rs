//! # Persistent Store
//!
//! Connection pool, the [`IdentityStore`] port, and its SQL implementation.

// region: --- Modules
pub mod identity_repository;
pub mod models;
// endregion: --- Modules

// region: --- Re-exports
pub use identity_repository::SqlIdentityStore;
// endregion: --- Re-exports

use crate::error::Result;
use async_trait::async_trait;
use models::{Identity, IdentityForCreate};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};

/// Type alias for the SQLite connection pool.
pub type DbPool = SqlitePool;

/// Create a new SQLite connection pool.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// Operations the authentication subsystem needs from the persistent store.
///
/// Kept narrow so service code can be exercised against a test double. Errors
/// are always dependency failures (`AuthError::Unavailable` or `NotFound`);
/// "no such row" is `Ok(None)` or a `bool`, never an error.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    /// Create a new identity. Unconfirmed, role `user`.
    async fn create(&self, identity: IdentityForCreate) -> Result<Identity>;

    /// Unconditionally overwrite the stored refresh token (login path).
    async fn update_refresh_token(&self, id: i64, refresh_token: Option<&str>) -> Result<()>;

    /// Compare-and-swap rotation of the refresh token (refresh path).
    ///
    /// Succeeds only if the stored token still equals `current`; returns
    /// `false` when it was superseded concurrently. This is what keeps two
    /// racing refresh attempts from both rotating.
    async fn rotate_refresh_token(&self, id: i64, current: &str, next: &str) -> Result<bool>;

    /// Mark the identity with this email as confirmed.
    async fn update_confirmed(&self, email: &str) -> Result<()>;
}
