//! # Data Transfer Objects
//!
//! Serializable types exchanged with boundary code.

pub mod auth;

pub use auth::TokenPair;
