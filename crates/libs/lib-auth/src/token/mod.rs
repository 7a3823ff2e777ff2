//! # Token Codec
//!
//! Signed, time-bound token encoding and decoding for the three token kinds the
//! backend issues: access, refresh, and email-confirmation.
//!
//! Every token carries `iat`, `exp`, and its kind; `decode` always asserts the
//! kind the caller expects, so a refresh token can never pass where an access
//! token is required. Signing uses one process-wide secret and algorithm from
//! configuration; rotating the secret invalidates all outstanding tokens.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lib_utils::time::now_utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validity of email-confirmation tokens, fixed by product decision.
pub const EMAIL_TOKEN_TTL_DAYS: i64 = 7;

/// The kind of a signed token, carried in its claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    EmailConfirmation,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
            TokenKind::EmailConfirmation => write!(f, "email_confirmation"),
        }
    }
}

/// Decoded token payload.
///
/// `sub` is the username for access/refresh tokens and the email address for
/// email-confirmation tokens. Claims are ephemeral: constructed and consumed
/// per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username, or email for confirmation tokens)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id.
    ///
    /// Timestamps have second resolution and HMAC signing is deterministic,
    /// so without this two tokens minted in the same second for the same
    /// subject would be byte-identical. Rotation relies on every minted token
    /// being distinct.
    pub jti: String,
    /// Token kind
    pub token_type: TokenKind,
}

/// Errors produced by token encoding and decoding.
///
/// Note for boundary code: `Expired`, `Invalid`, and `KindMismatch` must be
/// indistinguishable in responses. Log the variant, surface a generic failure.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unsupported signing algorithm: {0}")]
    Algorithm(String),

    #[error("failed to encode token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token is expired")]
    Expired,

    #[error("token is invalid: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("expected {expected} token, got {actual}")]
    KindMismatch {
        expected: TokenKind,
        actual: TokenKind,
    },
}

/// Encoder/decoder over the process-wide signing secret.
///
/// Built once at startup from configuration and handed to the services that
/// mint or verify tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from a shared secret and an HMAC algorithm name
    /// (`HS256`, `HS384`, or `HS512`).
    pub fn new(secret: &str, algorithm: &str) -> Result<Self, TokenError> {
        // Only the symmetric HMAC family makes sense with a shared secret.
        let algorithm = match algorithm {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => return Err(TokenError::Algorithm(other.to_string())),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        // No clock-skew tolerance: an expired token is expired.
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(algorithm),
            validation,
        })
    }

    /// Encode a signed token for `subject` valid for `ttl` from now.
    pub fn encode(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = now_utc();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
        };

        encode(&self.header, &claims, &self.encoding_key).map_err(TokenError::Encode)
    }

    /// Encode an email-confirmation token for `email` with the fixed 7-day
    /// validity. Structurally identical to the other kinds and decoded through
    /// the same path.
    pub fn encode_email_token(&self, email: &str) -> Result<String, TokenError> {
        self.encode(
            email,
            TokenKind::EmailConfirmation,
            Duration::days(EMAIL_TOKEN_TTL_DAYS),
        )
    }

    /// Decode and validate a token, asserting it is of the expected kind.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            }
        })?;

        if data.claims.token_type != expected {
            return Err(TokenError::KindMismatch {
                expected,
                actual: data.claims.token_type,
            });
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-must-be-at-least-32-characters!";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, "HS256").expect("codec construction should succeed")
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let codec = codec();
        let token = codec
            .encode("alice", TokenKind::Access, Duration::minutes(15))
            .expect("encoding should succeed");
        let claims = codec
            .decode(&token, TokenKind::Access)
            .expect("decoding should succeed");

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_back_to_back_mints_are_distinct() {
        let codec = codec();

        // Same subject, kind, and TTL within one wall-clock second: the jti
        // must still make the encoded tokens differ.
        let first = codec
            .encode("alice", TokenKind::Refresh, Duration::days(7))
            .expect("encoding should succeed");
        let second = codec
            .encode("alice", TokenKind::Refresh, Duration::days(7))
            .expect("encoding should succeed");

        assert_ne!(first, second);
    }

    #[test]
    fn test_kind_mismatch_rejected_both_directions() {
        let codec = codec();
        let access = codec
            .encode("alice", TokenKind::Access, Duration::minutes(15))
            .expect("encoding should succeed");
        let refresh = codec
            .encode("alice", TokenKind::Refresh, Duration::days(7))
            .expect("encoding should succeed");

        assert!(matches!(
            codec.decode(&access, TokenKind::Refresh),
            Err(TokenError::KindMismatch { .. })
        ));
        assert!(matches!(
            codec.decode(&refresh, TokenKind::Access),
            Err(TokenError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let token = codec
            .encode("alice", TokenKind::Access, Duration::seconds(-10))
            .expect("encoding should succeed");

        assert!(matches!(
            codec.decode(&token, TokenKind::Access),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = codec();
        let other = TokenCodec::new("another-secret-that-is-also-32-chars-long!!", "HS256")
            .expect("codec construction should succeed");
        let token = codec
            .encode("alice", TokenKind::Access, Duration::minutes(15))
            .expect("encoding should succeed");

        assert!(matches!(
            other.decode(&token, TokenKind::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_structurally_malformed_token_rejected() {
        let codec = codec();
        assert!(matches!(
            codec.decode("not.a.jwt", TokenKind::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_email_token_kind_and_ttl() {
        let codec = codec();
        let token = codec
            .encode_email_token("alice@example.com")
            .expect("encoding should succeed");
        let claims = codec
            .decode(&token, TokenKind::EmailConfirmation)
            .expect("decoding should succeed");

        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, EMAIL_TOKEN_TTL_DAYS * 24 * 60 * 60);

        // A confirmation token is not an access token.
        assert!(matches!(
            codec.decode(&token, TokenKind::Access),
            Err(TokenError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_non_hmac_algorithm_rejected() {
        assert!(matches!(
            TokenCodec::new(SECRET, "RS256"),
            Err(TokenError::Algorithm(_))
        ));
        assert!(matches!(
            TokenCodec::new(SECRET, "bogus"),
            Err(TokenError::Algorithm(_))
        ));
    }
}
