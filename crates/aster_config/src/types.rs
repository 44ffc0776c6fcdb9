//! Configuration types deserialized from `aster.toml`.

use serde::Deserialize;

/// The top-level project configuration parsed from `aster.toml`.
///
/// Contains the project identity, cache and build settings, and the file
/// sources declared for each bundle type.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version).
    pub project: ProjectMeta,
    /// Persisted module cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Build output settings.
    #[serde(default)]
    pub build: BuildConfig,
    /// Sources of script bundles.
    #[serde(default)]
    pub scripts: Vec<SourceConfig>,
    /// Sources of stylesheet bundles.
    #[serde(default)]
    pub stylesheets: Vec<SourceConfig>,
    /// Sources of HTML template bundles.
    #[serde(default)]
    pub templates: Vec<SourceConfig>,
}

impl ProjectConfig {
    /// Total number of declared sources across all bundle types.
    pub fn source_count(&self) -> usize {
        self.scripts.len() + self.stylesheets.len() + self.templates.len()
    }

    /// Every declared source with the table it was declared in.
    pub fn sources(&self) -> impl Iterator<Item = (&'static str, &SourceConfig)> {
        self.scripts
            .iter()
            .map(|s| ("scripts", s))
            .chain(self.stylesheets.iter().map(|s| ("stylesheets", s)))
            .chain(self.templates.iter().map(|s| ("templates", s)))
    }
}

/// Core project metadata required in every `aster.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string. Changing it invalidates every cached
    /// module container.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Module cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Whether builds consult and write the cache.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cache directory, relative to the project root.
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_cache_dir(),
        }
    }
}

/// Build output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    /// Minify processed output.
    #[serde(default)]
    pub minify: bool,
    /// Output directory, relative to the project root.
    #[serde(default = "default_output_dir")]
    pub output: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            minify: false,
            output: default_output_dir(),
        }
    }
}

/// One file source for a bundle type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// Base directory, relative to the project root.
    pub base: String,
    /// Glob pattern matched under the base (or under each subdirectory).
    pub pattern: String,
    /// How matched files are grouped into modules.
    #[serde(default)]
    pub layout: Layout,
    /// Whether the built modules may be cached.
    #[serde(default = "default_true")]
    pub persistent: bool,
}

/// Grouping of matched files into modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One module per file.
    #[default]
    PerFile,
    /// One module per immediate subdirectory of the base.
    PerDirectory,
}

fn default_true() -> bool {
    true
}

fn default_cache_dir() -> String {
    ".aster-cache".to_string()
}

fn default_output_dir() -> String {
    "dist".to_string()
}
