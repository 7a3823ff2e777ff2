//! # Authentication Library
//!
//! Credential hashing and signed-token encoding/decoding. Pure building blocks:
//! no I/O, no store access, no caching.

pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use pwd::{hash_password, verify_password, PwdError};
pub use token::{Claims, TokenCodec, TokenError, TokenKind};
