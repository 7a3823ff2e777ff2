//! # Core Library
//!
//! Configuration, error taxonomy, domain model, persistent store, and identity
//! cache for the contacts backend's authentication subsystem.

pub mod cache;
pub mod config;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AuthError, Result};
pub use model::store::models::{AuthenticatedIdentity, Identity, IdentityForCreate, Role};
pub use model::store::{create_pool, DbPool, IdentityStore, SqlIdentityStore};
