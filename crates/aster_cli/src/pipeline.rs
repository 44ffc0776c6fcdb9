//! Shared helpers for CLI commands: project root resolution, configuration
//! loading and orchestrator setup.

use std::path::{Path, PathBuf};

use aster_bundles::{
    FileSource, HtmlTemplateBundle, HtmlTemplateBundleFactory, ScriptBundle, ScriptBundleFactory,
    SourceLayout, StylesheetBundle, StylesheetBundleFactory,
};
use aster_common::ContentHash;
use aster_config::{Layout, ProjectConfig, SourceConfig, CONFIG_FILE};
use aster_pipeline::{Application, Orchestrator, PipelineError, Settings};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `aster.toml`.
///
/// Returns the directory containing `aster.toml`, or an error if none is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `aster.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Loads the project configuration, honouring an explicit `--config` file.
pub fn load_project_config(
    global: &GlobalArgs,
    root: &Path,
) -> Result<ProjectConfig, Box<dyn std::error::Error>> {
    let config = match global.config {
        Some(ref path) if Path::new(path).is_file() => aster_config::load_config_file(Path::new(path))?,
        _ => aster_config::load_config(root)?,
    };
    Ok(config)
}

/// Converts a configured source into a file source.
pub fn file_source(config: &SourceConfig) -> FileSource {
    let layout = match config.layout {
        Layout::PerFile => SourceLayout::PerFile,
        Layout::PerDirectory => SourceLayout::PerDirectory,
    };
    FileSource::new(&config.base, &config.pattern, layout).persistent(config.persistent)
}

/// Processing settings taken from the `[build]` table.
pub fn settings(config: &ProjectConfig) -> Settings {
    Settings {
        minify: config.build.minify,
    }
}

/// The version token caches are keyed on: the project version followed by a
/// hash of the processing settings, so changing a setting forces a rebuild.
pub fn cache_version(config: &ProjectConfig) -> Result<String, serde_json::Error> {
    let settings = serde_json::to_vec(&settings(config))?;
    Ok(format!(
        "{}+{}",
        config.project.version,
        ContentHash::from_bytes(&settings)
    ))
}

/// Creates an orchestrator for the project with every bundle factory and
/// every configured source registered.
pub fn configure(root: &Path, config: &ProjectConfig) -> Result<Orchestrator, PipelineError> {
    let application = Application::new(root).with_settings(settings(config));
    let mut orchestrator = Orchestrator::new(application, root.join(&config.cache.dir));
    orchestrator
        .register_factory::<ScriptBundle, _>(ScriptBundleFactory)
        .register_factory::<StylesheetBundle, _>(StylesheetBundleFactory)
        .register_factory::<HtmlTemplateBundle, _>(HtmlTemplateBundleFactory);

    orchestrator
        .add_all::<ScriptBundle, _, _>(config.scripts.iter().map(file_source))?
        .add_all::<StylesheetBundle, _, _>(config.stylesheets.iter().map(file_source))?
        .add_all::<HtmlTemplateBundle, _, _>(config.templates.iter().map(file_source))?;
    Ok(orchestrator)
}
