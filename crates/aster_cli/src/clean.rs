//! `aster clean` — removes the persisted module cache.

use std::path::Path;

use aster_bundles::{HtmlTemplateBundle, ScriptBundle, StylesheetBundle};
use aster_cache::{CacheError, ModuleCache};
use aster_pipeline::Module;

use crate::{pipeline, GlobalArgs};

/// Runs the `aster clean` command.
///
/// Returns exit code 0 on success, including when there was nothing to remove.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let root = pipeline::resolve_project_root(global)?;
    let config = pipeline::load_project_config(global, &root)?;
    let cache_dir = root.join(&config.cache.dir);

    let removed = clean(&cache_dir)?;
    if !global.quiet {
        if removed {
            eprintln!("   Removed {}", cache_dir.display());
        } else {
            eprintln!("   Nothing to clean");
        }
    }
    Ok(0)
}

/// Clears every per-type cache under `cache_dir`, then the directory itself.
///
/// Returns `false` if there was no cache directory.
pub fn clean(cache_dir: &Path) -> Result<bool, CacheError> {
    if !cache_dir.exists() {
        return Ok(false);
    }
    clear::<ScriptBundle>(cache_dir)?;
    clear::<StylesheetBundle>(cache_dir)?;
    clear::<HtmlTemplateBundle>(cache_dir)?;
    std::fs::remove_dir_all(cache_dir).map_err(|source| CacheError::Io {
        path: cache_dir.to_path_buf(),
        source,
    })?;
    tracing::info!(dir = %cache_dir.display(), "cache.cleaned");
    Ok(true)
}

fn clear<T: Module>(cache_dir: &Path) -> Result<(), CacheError> {
    ModuleCache::<T>::new(&cache_dir.join(T::KIND)).clear()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn removes_cache_tree() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join(".aster-cache");
        fs::create_dir_all(cache.join("ScriptBundle/containers")).unwrap();
        fs::write(cache.join("ScriptBundle/manifest.json"), "{}").unwrap();
        fs::create_dir_all(cache.join("stray")).unwrap();

        assert!(clean(&cache).unwrap());
        assert!(!cache.exists());
    }

    #[test]
    fn missing_cache_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!clean(&dir.path().join("none")).unwrap());
    }
}
