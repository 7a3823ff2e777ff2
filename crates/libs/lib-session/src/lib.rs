//! # Session Library
//!
//! Token-to-identity resolution and session management for the contacts
//! backend: login, refresh-with-rotation, and email-confirmation flows, built
//! on the `lib-auth` primitives and the `lib-core` store/cache ports.

pub mod resolver;
pub mod session;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use resolver::{require_admin, IdentityResolver};
pub use session::{ConfirmOutcome, SessionManager};

use lib_core::{AuthError, Result};
use std::future::Future;
use std::time::Duration;

/// Run a store call under the configured deadline.
///
/// A slow dependency must not hang a request; timeouts surface as
/// `Unavailable`, never as an authentication failure.
pub(crate) async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::Unavailable(format!(
            "{what} timed out after {limit:?}"
        ))),
    }
}
