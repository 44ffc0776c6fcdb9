//! Application context handed to sources, factories and module processing.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Ambient settings that affect how modules are processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Strip comments and whitespace from processed output.
    pub minify: bool,
}

/// The application a configuration pass builds modules for.
///
/// The orchestrator only reads [`root_dir`](Self::root_dir) (for cache
/// validity); everything else is passed through untouched.
#[derive(Debug, Clone)]
pub struct Application {
    root_dir: PathBuf,
    settings: Settings,
}

impl Application {
    /// Creates an application rooted at `root_dir` with default settings.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            settings: Settings::default(),
        }
    }

    /// Replaces the processing settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the application root directory.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Returns the processing settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolves a root-relative path. Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative() {
        let app = Application::new("/srv/site");
        assert_eq!(
            app.resolve("scripts/app.js"),
            PathBuf::from("/srv/site/scripts/app.js")
        );
    }

    #[test]
    fn resolve_absolute_is_unchanged() {
        let app = Application::new("/srv/site");
        assert_eq!(app.resolve("/etc/shared.css"), PathBuf::from("/etc/shared.css"));
    }

    #[test]
    fn settings_default_off() {
        let app = Application::new(".");
        assert!(!app.settings().minify);
        let app = app.with_settings(Settings { minify: true });
        assert!(app.settings().minify);
    }
}
