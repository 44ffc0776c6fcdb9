//! HTML template bundles embedded as inert script blocks.

use std::path::PathBuf;

use aster_common::BoxError;
use aster_pipeline::{Application, Module, ModuleDescriptor, ModuleFactory};
use serde::{Deserialize, Serialize};

use crate::read_asset;

/// A bundle of HTML templates, one `<script type="text/html">` block per
/// file, identified by the file stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlTemplateBundle {
    /// Logical module path.
    pub path: String,
    /// Root-relative template files.
    pub assets: Vec<PathBuf>,
    /// Whether the bundle may be cached.
    pub persistent: bool,
    /// Rendered blocks, set by processing.
    pub output: Option<String>,
}

impl HtmlTemplateBundle {
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

impl Module for HtmlTemplateBundle {
    const KIND: &'static str = "HtmlTemplateBundle";

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
            let id = asset
                .file_stem()
                .map(|s| escape_attribute(&s.to_string_lossy()))
                .unwrap_or_default();
            let body = if minify { text.trim() } else { text.trim_end() };
            out.push_str(&format!("<script id=\"{id}\" type=\"text/html\">"));
            if !minify {
                out.push('\n');
            }
            out.push_str(body);
            if !minify {
                out.push('\n');
            }
            out.push_str("</script>\n");
        }
        self.output = Some(out);
        Ok(())
    }

    fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

/// Escapes text for use inside a double-quoted attribute value.
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds [`HtmlTemplateBundle`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTemplateBundleFactory;

impl ModuleFactory<HtmlTemplateBundle> for HtmlTemplateBundleFactory {
    fn create_module(
        &self,
        descriptor: ModuleDescriptor,
        _application: &Application,
    ) -> Result<HtmlTemplateBundle, BoxError> {
        Ok(HtmlTemplateBundle::from_descriptor(descriptor))
    }
}
