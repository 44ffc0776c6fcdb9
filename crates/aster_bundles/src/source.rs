//! File-system module sources driven by glob patterns.

use std::path::{Path, PathBuf};

use aster_common::{latest_modification, BoxError};
use aster_pipeline::{Application, Module, ModuleDescriptor, ModuleFactory, ModuleSource, SourceResult};

use crate::error::BundleError;
use crate::slash_path;

/// How matched files are grouped into modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// Every matching file becomes its own module.
    PerFile,
    /// Every immediate subdirectory of the base becomes one module holding
    /// its matching files.
    PerDirectory,
}

/// Discovers modules under a root-relative base directory.
///
/// Module paths are root-relative with forward slashes. A per-file module is
/// named after its file without the extension; a per-directory module after
/// its directory. Matches are sorted so discovery order is stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    base: PathBuf,
    pattern: String,
    layout: SourceLayout,
    persistent: bool,
}

impl FileSource {
    /// One module per file matching `pattern` under `base`.
    pub fn per_file(base: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self::new(base, pattern, SourceLayout::PerFile)
    }

    /// One module per subdirectory of `base`, holding its files matching
    /// `pattern`.
    pub fn per_directory(base: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self::new(base, pattern, SourceLayout::PerDirectory)
    }

    /// Creates a persistent source with the given layout.
    pub fn new(base: impl Into<PathBuf>, pattern: impl Into<String>, layout: SourceLayout) -> Self {
        Self {
            base: base.into(),
            pattern: pattern.into(),
            layout,
            persistent: true,
        }
    }

    /// Sets whether the discovered modules may be cached.
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// The root-relative base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The glob pattern, relative to the base (or to each subdirectory).
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The grouping layout.
    pub fn layout(&self) -> SourceLayout {
        self.layout
    }

    /// Lists the descriptors this source would produce, with the absolute
    /// paths of every backing file.
    pub fn discover(
        &self,
        application: &Application,
    ) -> Result<(Vec<ModuleDescriptor>, Vec<PathBuf>), BundleError> {
        let root = application.root_dir();
        let base = application.resolve(&self.base);
        if !base.is_dir() {
            return Err(BundleError::Scan {
                path: base,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let mut descriptors = Vec::new();
        let mut backing = Vec::new();
        match self.layout {
            SourceLayout::PerFile => {
                for file in self.matches(&base)? {
                    let relative = relative(&file, root);
                    let name = slash_path(&relative.with_extension(""));
                    descriptors.push(
                        ModuleDescriptor::new(name, vec![relative]).persistent(self.persistent),
                    );
                    backing.push(file);
                }
            }
            SourceLayout::PerDirectory => {
                for dir in subdirectories(&base)? {
                    let files = self.matches(&dir)?;
                    if files.is_empty() {
                        continue;
                    }
                    let assets = files.iter().map(|f| relative(f, root)).collect();
                    descriptors.push(
                        ModuleDescriptor::new(slash_path(&relative(&dir, root)), assets)
                            .persistent(self.persistent),
                    );
                    backing.extend(files);
                }
            }
        }
        Ok((descriptors, backing))
    }

    fn matches(&self, dir: &Path) -> Result<Vec<PathBuf>, BundleError> {
        let escaped = glob::Pattern::escape(&dir.to_string_lossy());
        let full = format!("{}/{}", escaped, self.pattern);
        let entries = glob::glob(&full).map_err(|e| BundleError::InvalidPattern {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| BundleError::Scan {
                path: e.path().to_path_buf(),
                source: e.into(),
            })?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn subdirectories(base: &Path) -> Result<Vec<PathBuf>, BundleError> {
    let scan = |source: std::io::Error| BundleError::Scan {
        path: base.to_path_buf(),
        source,
    };
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(base).map_err(scan)? {
        let path = entry.map_err(scan)?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn relative(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

impl<T: Module> ModuleSource<T> for FileSource {
    fn get_modules(
        &self,
        factory: &dyn ModuleFactory<T>,
        application: &Application,
    ) -> Result<SourceResult<T>, BoxError> {
        let (descriptors, backing) = self.discover(application)?;
        let last_write = latest_modification(&backing).map_err(|source| BundleError::Scan {
            path: application.resolve(&self.base),
            source,
        })?;

        let modules = descriptors
            .into_iter()
            .map(|d| factory.create_module(d, application))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            kind = T::KIND,
            source = %ModuleSource::<T>::describe(self),
            modules = modules.len(),
            "source.scanned"
        );
        Ok(SourceResult::new(modules, last_write))
    }

    fn describe(&self) -> String {
        format!("{}/{}", slash_path(&self.base), self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{ScriptBundle, ScriptBundleFactory};
    use aster_common::{modified_time, EPOCH};
    use std::fs;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("scripts/admin")).unwrap();
        fs::create_dir_all(root.join("scripts/shop")).unwrap();
        fs::create_dir_all(root.join("scripts/empty")).unwrap();
        fs::write(root.join("scripts/main.js"), "main();").unwrap();
        fs::write(root.join("scripts/vendor.js"), "vendor();").unwrap();
        fs::write(root.join("scripts/readme.txt"), "ignore").unwrap();
        fs::write(root.join("scripts/admin/b.js"), "b();").unwrap();
        fs::write(root.join("scripts/admin/a.js"), "a();").unwrap();
        fs::write(root.join("scripts/shop/cart.js"), "cart();").unwrap();
        dir
    }

    fn scan(source: &FileSource, root: &Path) -> SourceResult<ScriptBundle> {
        ModuleSource::<ScriptBundle>::get_modules(
            source,
            &ScriptBundleFactory,
            &Application::new(root),
        )
        .unwrap()
    }

    #[test]
    fn per_file_modules_sorted() {
        let dir = site();
        let result = scan(&FileSource::per_file("scripts", "*.js"), dir.path());
        let paths: Vec<_> = result.modules().iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["scripts/main", "scripts/vendor"]);
        assert_eq!(result.modules()[0].assets, vec![PathBuf::from("scripts/main.js")]);

        let newest = modified_time(&dir.path().join("scripts/main.js"))
            .unwrap()
            .max(modified_time(&dir.path().join("scripts/vendor.js")).unwrap());
        assert_eq!(result.last_write_time_max(), newest);
    }

    #[test]
    fn per_directory_groups_and_skips_empty() {
        let dir = site();
        let result = scan(&FileSource::per_directory("scripts", "*.js"), dir.path());
        let paths: Vec<_> = result.modules().iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["scripts/admin", "scripts/shop"]);
        assert_eq!(
            result.modules()[0].assets,
            vec![PathBuf::from("scripts/admin/a.js"), PathBuf::from("scripts/admin/b.js")]
        );
    }

    #[test]
    fn persistence_is_propagated() {
        let dir = site();
        let result = scan(
            &FileSource::per_file("scripts", "main.js").persistent(false),
            dir.path(),
        );
        assert_eq!(result.len(), 1);
        assert!(!result.modules()[0].persistent);
    }

    #[test]
    fn no_matches_is_empty_at_epoch() {
        let dir = site();
        let result = scan(&FileSource::per_file("scripts", "*.coffee"), dir.path());
        assert!(result.is_empty());
        assert_eq!(result.last_write_time_max(), EPOCH);
    }

    #[test]
    fn missing_base_fails() {
        let dir = site();
        let err = ModuleSource::<ScriptBundle>::get_modules(
            &FileSource::per_file("nowhere", "*.js"),
            &ScriptBundleFactory,
            &Application::new(dir.path()),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::Scan { .. })
        ));
    }

    #[test]
    fn invalid_pattern_fails() {
        let dir = site();
        let err = ModuleSource::<ScriptBundle>::get_modules(
            &FileSource::per_file("scripts", "[*.js"),
            &ScriptBundleFactory,
            &Application::new(dir.path()),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BundleError>(),
            Some(BundleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn describe_names_base_and_pattern() {
        let source = FileSource::per_directory("templates", "*.html");
        assert_eq!(ModuleSource::<ScriptBundle>::describe(&source), "templates/*.html");
    }
}
