//! # Identity Repository
//!
//! SQL implementation of the [`IdentityStore`] port over the shared pool.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{create_pool, IdentityStore, SqlIdentityStore};
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_pool("sqlite::memory:").await?;
//! let store = SqlIdentityStore::new(pool);
//!
//! let found = store.find_by_username("alice").await?;
//! assert!(found.is_none());
//! # Ok(())
//! # }
//! ```

use super::models::{Identity, IdentityForCreate};
use super::{DbPool, IdentityStore};
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use sqlx::query_as;

/// SQL-backed identity store.
#[derive(Clone)]
pub struct SqlIdentityStore {
    pool: DbPool,
}

impl SqlIdentityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for SqlIdentityStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        let identity = query_as::<_, Identity>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let identity = query_as::<_, Identity>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(identity)
    }

    async fn create(&self, identity: IdentityForCreate) -> Result<Identity> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, avatar_url) VALUES (?, ?, ?, ?)",
        )
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(&identity.avatar_url)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();

        let created = query_as::<_, Identity>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn update_refresh_token(&self, id: i64, refresh_token: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
            .bind(refresh_token)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn rotate_refresh_token(&self, id: i64, current: &str, next: &str) -> Result<bool> {
        // Single-statement CAS: the WHERE clause re-checks the presented token
        // so concurrent rotations cannot both succeed.
        let result =
            sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ? AND refresh_token = ?")
                .bind(next)
                .bind(id)
                .bind(current)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_confirmed(&self, email: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET confirmed = 1 WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound);
        }

        Ok(())
    }
}
