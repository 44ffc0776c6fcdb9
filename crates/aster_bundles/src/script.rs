//! Script bundles: ordered concatenation of JavaScript files.

use std::path::PathBuf;

use aster_common::BoxError;
use aster_pipeline::{Application, Module, ModuleDescriptor, ModuleFactory};
use serde::{Deserialize, Serialize};

use crate::{read_asset, slash_path};

/// A bundle of script files concatenated in asset order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBundle {
    /// Logical module path.
    pub path: String,
    /// Root-relative script files.
    pub assets: Vec<PathBuf>,
    /// Whether the bundle may be cached.
    pub persistent: bool,
    /// Concatenated output, set by processing.
    pub output: Option<String>,
}

impl ScriptBundle {
    /// Creates an unprocessed bundle from a descriptor.
    pub fn from_descriptor(descriptor: ModuleDescriptor) -> Self {
        Self {
            path: descriptor.path,
            assets: descriptor.assets,
            persistent: descriptor.persistent,
            output: None,
        }
    }
}

impl Module for ScriptBundle {
    const KIND: &'static str = "ScriptBundle";

    fn path(&self) -> &str {
        &self.path
    }

    fn is_persistent(&self) -> bool {
        self.persistent
    }

    fn process(&mut self, application: &Application) -> Result<(), BoxError> {
        let minify = application.settings().minify;
        let mut out = String::new();
        for asset in &self.assets {
            let text = read_asset(application, asset)?;
            if minify {
                out.push_str(text.trim());
            } else {
                out.push_str("// ");
                out.push_str(&slash_path(asset));
                out.push('\n');
                out.push_str(&text);
            }
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        self.output = Some(out);
        Ok(())
    }

    fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

/// Builds [`ScriptBundle`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptBundleFactory;

impl ModuleFactory<ScriptBundle> for ScriptBundleFactory {
    fn create_module(
        &self,
        descriptor: ModuleDescriptor,
        _application: &Application,
    ) -> Result<ScriptBundle, BoxError> {
        Ok(ScriptBundle::from_descriptor(descriptor))
    }
}
