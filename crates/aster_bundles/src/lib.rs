//! Concrete bundle modules, their factories and file-system sources.
//!
//! Three module types are provided: [`ScriptBundle`], [`StylesheetBundle`]
//! and [`HtmlTemplateBundle`]. Each is built from a [`ModuleDescriptor`]
//! discovered by a [`FileSource`] and processed against the application
//! root. Stylesheets go through the process-wide, mutex-guarded
//! [`StylesheetCompiler`] returned by [`shared_compiler`].
//!
//! [`ModuleDescriptor`]: aster_pipeline::ModuleDescriptor

#![warn(missing_docs)]

pub mod compiler;
pub mod css;
pub mod error;
pub mod references;
pub mod script;
pub mod source;
pub mod stylesheet;
pub mod template;

pub use compiler::{
    install_compiler, shared_compiler, CompileContext, CompileOutput, CompilerEngine, Serialized,
    StylesheetCompiler,
};
pub use css::CssCompiler;
pub use error::{BundleError, CompileError};
pub use script::{ScriptBundle, ScriptBundleFactory};
pub use source::{FileSource, SourceLayout};
pub use stylesheet::{StylesheetBundle, StylesheetBundleFactory};
pub use template::{HtmlTemplateBundle, HtmlTemplateBundleFactory};

use std::path::Path;

use aster_pipeline::Application;

/// Reads a root-relative asset, attaching the path to any I/O error.
pub(crate) fn read_asset(application: &Application, asset: &Path) -> Result<String, BundleError> {
    let path = application.resolve(asset);
    std::fs::read_to_string(&path).map_err(|source| BundleError::ReadAsset { path, source })
}

/// Converts a path to the forward-slash form used for module paths.
pub(crate) fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
