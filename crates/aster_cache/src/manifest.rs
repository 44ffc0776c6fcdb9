//! Per-type cache manifest.
//!
//! The manifest is stored as `manifest.json` in a module type's cache
//! directory. It names the payload holding the persisted container and
//! records everything needed to decide whether that payload is still valid.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use aster_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::artifact::{write_atomic, ARTIFACT_FORMAT_VERSION};
use crate::error::CacheError;

/// Name of the manifest file within a cache directory.
const MANIFEST_FILE: &str = "manifest.json";

/// Snapshot metadata for one persisted module container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Artifact format version the payload was written with.
    pub format_version: u32,

    /// Application version token supplied when the snapshot was saved.
    pub application_version: String,

    /// When the snapshot was saved.
    pub built_at: SystemTime,

    /// Application root directory at save time. Processed modules may embed
    /// absolute paths, so a relocated root invalidates the snapshot.
    pub root_dir: PathBuf,

    /// Key of the payload artifact in the `containers/` store.
    pub container_key: String,

    /// Number of modules in the payload.
    pub module_count: usize,
}

impl CacheManifest {
    /// Creates a manifest stamped with the current time.
    pub fn new(
        application_version: &str,
        root_dir: &Path,
        container_key: String,
        module_count: usize,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            application_version: application_version.to_string(),
            built_at: SystemTime::now(),
            root_dir: root_dir.to_path_buf(),
            container_key,
            module_count,
        }
    }

    /// Loads the manifest from a cache directory.
    ///
    /// Returns `None` if the file doesn't exist, can't be parsed or names a
    /// payload key that is not a content hash, which callers treat as a
    /// cache miss.
    pub fn load(cache_dir: &Path) -> Option<Self> {
        let path = cache_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(path).ok()?;
        let manifest: Self = serde_json::from_str(&content).ok()?;
        manifest
            .container_key
            .parse::<ContentHash>()
            .is_ok()
            .then_some(manifest)
    }

    /// Saves the manifest atomically, creating the directory if needed.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(CacheError::io(cache_dir))?;
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        write_atomic(&cache_dir.join(MANIFEST_FILE), json.as_bytes())
    }

    /// Returns `true` if this snapshot is valid for the given inputs.
    ///
    /// The snapshot must have been built no earlier than the newest source
    /// modification, with exactly the same application version, against the
    /// same root directory, using the current artifact format.
    pub fn is_current(
        &self,
        last_write_time_max: SystemTime,
        application_version: &str,
        root_dir: &Path,
    ) -> bool {
        self.format_version == ARTIFACT_FORMAT_VERSION
            && self.built_at >= last_write_time_max
            && self.application_version == application_version
            && self.root_dir == root_dir
    }
}
