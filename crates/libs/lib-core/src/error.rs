//! # Centralized Error Handling
//!
//! Application-wide error type for the authentication subsystem, following the
//! `thiserror` pattern used across the workspace.
//!
//! The taxonomy distinguishes authentication failures (terminal, user-visible,
//! never retried) from dependency failures (`Unavailable`). A store outage must
//! surface as `Unavailable`, never be mapped to `Unverified`: a caller should
//! be able to tell "you are not who you claim" apart from "I cannot check right
//! now". Cache outages are not represented here at all: the cache layer has its
//! own error type and callers treat every cache error as a miss.
//!
//! `user_message()` produces the boundary-safe string for each variant. In
//! particular it never distinguishes an expired token from a forged one; that
//! detail belongs in logs only.

use thiserror::Error;

/// Convenience type alias for `Result<T, AuthError>`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Authentication subsystem error type.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login failed: unknown user or wrong password.
    ///
    /// **HTTP mapping**: 401 Unauthorized
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Credentials verified but the email address was never confirmed.
    ///
    /// **HTTP mapping**: 401 Unauthorized
    #[error("email address is not confirmed")]
    NotConfirmed,

    /// Bearer token rejected: bad signature, malformed, expired, wrong kind,
    /// or unknown subject.
    ///
    /// **HTTP mapping**: 401 Unauthorized
    #[error("could not verify credentials")]
    Unverified,

    /// Refresh token rejected: decode failure, or the presented token was
    /// superseded by a later rotation.
    ///
    /// **HTTP mapping**: 401 Unauthorized
    #[error("invalid or expired refresh token")]
    InvalidRefreshToken,

    /// The identity's role does not permit the operation.
    ///
    /// **HTTP mapping**: 403 Forbidden
    #[error("insufficient access permissions")]
    Forbidden,

    /// Referenced user does not exist (confirmation/email flows).
    ///
    /// **HTTP mapping**: 404 Not Found
    #[error("user not found")]
    NotFound,

    /// A required dependency (persistent store) failed or timed out.
    ///
    /// **HTTP mapping**: 503 Service Unavailable
    #[error("dependency unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    /// Boundary-safe message for this error.
    ///
    /// Wording is stable and intentionally vague where detail would leak
    /// internals (token failures, dependency outages).
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Wrong email or password",
            AuthError::NotConfirmed => "Email address is not confirmed",
            AuthError::Unverified => "Could not verify credentials",
            AuthError::InvalidRefreshToken => "Invalid or expired refresh token",
            AuthError::Forbidden => "Insufficient access permissions",
            AuthError::NotFound => "User not found",
            AuthError::Unavailable(_) => "Service temporarily unavailable",
        }
    }

    /// Whether this is a dependency failure rather than an authentication
    /// outcome.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AuthError::Unavailable(_))
    }
}

/// Convert `sqlx::Error` to `AuthError`.
///
/// Every store error is a dependency failure. `RowNotFound` is deliberately
/// not mapped to `NotFound`: the repositories use `fetch_optional` and decide
/// absence semantics themselves.
impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        // Full detail goes to the logs; the variant carries a summary and
        // user_message() hides even that.
        tracing::error!("[STORE] database error: {err}");
        AuthError::Unavailable(format!("store error: {err}"))
    }
}
