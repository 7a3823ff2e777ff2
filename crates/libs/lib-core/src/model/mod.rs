//! # Domain Model
//!
//! Identity entities and the persistent store.

pub mod store;
