//! Shared foundational types used across the Aster asset pipeline.
//!
//! This crate provides content hashing for cache keys and integrity checks,
//! modification-time helpers used for cache invalidation, and the boxed error
//! type that user-supplied callbacks report failures with.

#![warn(missing_docs)]

pub mod error;
pub mod hash;
pub mod mtime;

pub use error::BoxError;
pub use hash::{ContentHash, ParseHashError};
pub use mtime::{latest_modification, modified_time, EPOCH};
