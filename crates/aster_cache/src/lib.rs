//! Persisted module cache.
//!
//! Each module type gets its own cache directory holding a JSON manifest and
//! a checksummed binary payload with the persistent modules of the last
//! build. The manifest records the application version, the root directory
//! and the build time so a later run can decide whether the payload is still
//! valid without reprocessing any module.

#![warn(missing_docs)]

pub mod artifact;
pub mod cache;
pub mod error;
pub mod manifest;

pub use artifact::{ArtifactHeader, ArtifactStore};
pub use cache::ModuleCache;
pub use error::CacheError;
pub use manifest::CacheManifest;
