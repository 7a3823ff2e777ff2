//! # Application Configuration
//!
//! Configuration loaded from environment variables and validated on startup so
//! a misconfigured process fails fast. The struct is immutable after load and
//! injected into the components that need it; nothing mutates configuration at
//! runtime.

use lib_utils::envs::{get_env, get_env_or, get_env_parse_or};

/// Process-wide configuration for the authentication subsystem.
#[derive(Clone, Debug)]
pub struct Config {
    /// SQLite database connection URL
    pub database_url: String,

    /// Redis connection URL for the identity cache
    pub redis_url: String,

    /// Secret key for token signing and verification
    ///
    /// Must be at least 32 characters. Rotating it invalidates every
    /// outstanding token.
    pub jwt_secret: String,

    /// HMAC signing algorithm name (`HS256`, `HS384`, `HS512`)
    pub jwt_algorithm: String,

    /// Access-token validity in seconds
    pub access_token_ttl_secs: i64,

    /// Refresh-token validity in seconds
    pub refresh_token_ttl_secs: i64,

    /// Identity-cache entry TTL in seconds
    ///
    /// Also the upper bound on how long a role/avatar/confirmation change can
    /// remain invisible to `resolve`, since cached snapshots are never
    /// invalidated on mutation.
    pub cache_ttl_secs: u64,

    /// Upper bound in milliseconds on any single cache or store call
    pub dependency_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = get_env_or("DATABASE_URL", "sqlite:contacts.db");
        let redis_url = get_env_or("REDIS_URL", "redis://127.0.0.1:6379");

        let jwt_secret = get_env("JWT_SECRET").map_err(|e| e.to_string())?;
        let jwt_algorithm = get_env_or("JWT_ALGORITHM", "HS256");

        let access_token_ttl_secs =
            get_env_parse_or("JWT_EXPIRATION_SECONDS", 3_600).map_err(|e| e.to_string())?;
        let refresh_token_ttl_secs =
            get_env_parse_or("JWT_REFRESH_EXPIRATION_SECONDS", 604_800)
                .map_err(|e| e.to_string())?;
        let cache_ttl_secs =
            get_env_parse_or("CACHE_EXPIRATION_SECONDS", 300).map_err(|e| e.to_string())?;
        let dependency_timeout_ms =
            get_env_parse_or("DEPENDENCY_TIMEOUT_MS", 2_000).map_err(|e| e.to_string())?;

        Ok(Self {
            database_url,
            redis_url,
            jwt_secret,
            jwt_algorithm,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
            cache_ttl_secs,
            dependency_timeout_ms,
        })
    }

    /// Validate configuration values against security and operational rules.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters long".to_string());
        }

        if self.access_token_ttl_secs < 1 {
            return Err("JWT_EXPIRATION_SECONDS must be positive".to_string());
        }

        if self.refresh_token_ttl_secs <= self.access_token_ttl_secs {
            return Err(
                "JWT_REFRESH_EXPIRATION_SECONDS must exceed JWT_EXPIRATION_SECONDS".to_string(),
            );
        }

        if self.cache_ttl_secs == 0 {
            return Err("CACHE_EXPIRATION_SECONDS must be positive".to_string());
        }

        if self.dependency_timeout_ms == 0 {
            return Err("DEPENDENCY_TIMEOUT_MS must be positive".to_string());
        }

        Ok(())
    }
}
