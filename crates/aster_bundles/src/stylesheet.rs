//! Stylesheet bundles compiled through the shared compiler.

use std::path::{Path, PathBuf};

use aster_common::BoxError;
use aster_pipeline::{Application, Module, ModuleDescriptor, ModuleFactory};
use serde::{Deserialize, Serialize};

use crate::compiler::{shared_compiler, CompileContext, StylesheetCompiler};
use crate::read_asset;

/// A bundle of stylesheets, each compiled and then concatenated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylesheetBundle {
    /// Logical module path.
    pub path: String,
    /// Root-relative stylesheet files.
    pub assets: Vec<PathBuf>,
    /// Whether the bundle may be cached.
    pub persistent: bool,
    /// Every file the compiled output depends on, root-relative when the file
    /// lives under the application root.
    pub references: Vec<PathBuf>,
    /// Compiled output, set by processing.
    pub output: Option<String>,
}

impl StylesheetBundle {
    /// Creates an unprocessed bundle from a descriptor.
    pub fn from_descriptor(descriptor: ModuleDescriptor) -> Self {
        Self {
            path: descriptor.path,
            assets: descriptor.assets,
            persistent: descriptor.persistent,
            references: Vec::new(),
            output: None,
        }
    }

    /// Processes the bundle with an explicit compiler instead of the
    /// process-wide one.
    pub fn process_with(
        &mut self,
        compiler: &dyn StylesheetCompiler,
        application: &Application,
    ) -> Result<(), BoxError> {
        let minify = application.settings().minify;
        let mut css = String::new();
        let mut references: Vec<PathBuf> = Vec::new();

        for asset in &self.assets {
            let source = read_asset(application, asset)?;
            let context = CompileContext {
                minify,
                ..CompileContext::for_file(application.resolve(asset))
            };
            let compiled = compiler.compile(&source, &context)?;
            css.push_str(&compiled.css);
            if !css.ends_with('\n') {
                css.push('\n');
            }
            for reference in compiled.references {
                let reference = relative_to(&reference, application.root_dir());
                if !references.contains(&reference) {
                    references.push(reference);
                }
            }
        }

        tracing::debug!(module = %self.path, references = references.len(), "stylesheet.compiled");
        self.references = references;
        self.output = Some(css);
        Ok(())
    }
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Module for StylesheetBundle {
    const KIND: &'static str = "StylesheetBundle";

    fn path(&self) -> &str {
        &self.path
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }

    fn process(&mut self, application: &Application) -> Result<(), BoxError> {
        let compiler = shared_compiler();
        self.process_with(compiler.as_ref(), application)
    }

    fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

/// Builds [`StylesheetBundle`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesheetBundleFactory;

impl ModuleFactory<StylesheetBundle> for StylesheetBundleFactory {
    fn create_module(
        &self,
        descriptor: ModuleDescriptor,
        _application: &Application,
    ) -> Result<StylesheetBundle, BoxError> {
        Ok(StylesheetBundle::from_descriptor(descriptor))
    }
}
