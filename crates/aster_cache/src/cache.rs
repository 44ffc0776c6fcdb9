//! Per-type module cache.
//!
//! `ModuleCache` ties the manifest and the artifact store together into the
//! three operations the orchestrator needs: a validity check, a load and a
//! save. Validity checks are fail-safe; loads and saves report errors.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::artifact::ArtifactStore;
use crate::error::CacheError;
use crate::manifest::CacheManifest;

/// Subdirectory holding container payloads.
const CONTAINER_SUBDIR: &str = "containers";

/// File extension for container payloads.
const CONTAINER_EXT: &str = "bin";

/// Persisted store for the modules of a single type.
///
/// Lives in its own directory, normally `<cache_dir>/<module kind>`.
pub struct ModuleCache<T> {
    dir: PathBuf,
    store: ArtifactStore,
    _modules: PhantomData<fn() -> T>,
}

impl<T> ModuleCache<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a cache rooted at `dir`. Nothing is touched on disk.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            store: ArtifactStore::new(dir),
            _modules: PhantomData,
        }
    }

    /// Returns the cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the manifest of the current snapshot, if any.
    pub fn manifest(&self) -> Option<CacheManifest> {
        CacheManifest::load(&self.dir)
    }

    /// Returns `true` if the persisted snapshot may be used in place of a
    /// rebuild.
    ///
    /// A missing manifest, a damaged payload or any mismatch in build time,
    /// version or root directory all answer `false`.
    pub fn is_up_to_date(
        &self,
        last_write_time_max: SystemTime,
        application_version: &str,
        root_dir: &Path,
    ) -> bool {
        let Some(manifest) = self.manifest() else {
            tracing::debug!(dir = %self.dir.display(), "cache.miss (no manifest)");
            return false;
        };
        if !manifest.is_current(last_write_time_max, application_version, root_dir) {
            tracing::debug!(
                dir = %self.dir.display(),
                cached_version = %manifest.application_version,
                version = %application_version,
                "cache.stale"
            );
            return false;
        }
        match self
            .store
            .read_artifact(CONTAINER_SUBDIR, &manifest.container_key, CONTAINER_EXT)
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "cache.corrupt");
                false
            }
        }
    }

    /// Loads the persisted modules in their saved order.
    pub fn load_modules(&self) -> Result<Vec<T>, CacheError> {
        let manifest = self.manifest().ok_or_else(|| CacheError::MissingSnapshot {
            path: self.dir.clone(),
        })?;
        let payload =
            self.store
                .read_artifact(CONTAINER_SUBDIR, &manifest.container_key, CONTAINER_EXT)?;
        let (modules, _): (Vec<T>, usize) =
            bincode::serde::decode_from_slice(&payload, bincode::config::standard()).map_err(
                |e| CacheError::Serialization {
                    reason: e.to_string(),
                },
            )?;
        Ok(modules)
    }

    /// Persists `modules` as the new snapshot.
    ///
    /// The payload is written first under its content hash, then the
    /// manifest is swapped in atomically; finally payloads no longer
    /// referenced are removed. Returns the manifest that was written.
    pub fn save_modules<'a, I>(
        &self,
        modules: I,
        application_version: &str,
        root_dir: &Path,
    ) -> Result<CacheManifest, CacheError>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let modules: Vec<&T> = modules.into_iter().collect();
        let payload = bincode::serde::encode_to_vec(&modules, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        let key = self.store.write_artifact(
            CONTAINER_SUBDIR,
            CONTAINER_EXT,
            &payload,
            application_version,
        )?;
        let manifest = CacheManifest::new(application_version, root_dir, key, modules.len());
        manifest.save(&self.dir)?;

        let removed = self
            .store
            .gc(CONTAINER_SUBDIR, CONTAINER_EXT, &[manifest.container_key.as_str()])?;
        tracing::debug!(
            dir = %self.dir.display(),
            modules = manifest.module_count,
            stale_payloads = removed,
            "cache.saved"
        );
        Ok(manifest)
    }

    /// Removes the whole cache directory. A missing directory is not an error.
    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io {
                path: self.dir.clone(),
                source: e,
            }),
        }
    }
}
