//! The module contract and the factories that construct modules.

use std::path::PathBuf;

use aster_common::BoxError;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::application::Application;

/// One unit of build input and output, such as a script bundle.
///
/// Modules are cloned out of the registry for every build so that building
/// never consumes the registered sources, and are serializable so that the
/// persistent ones can be cached between runs.
pub trait Module: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable name of the module type. Used as the cache directory name and
    /// in log fields and error messages.
    const KIND: &'static str;

    /// Logical path identifying the module within its container.
    fn path(&self) -> &str;

    /// Whether the processed module may be cached to disk.
    ///
    /// Non-persistent modules are rebuilt on every run, even on a cache hit.
    fn is_persistent(&self) -> bool {
        true
    }

    /// Transforms the module in place (compiling, concatenating, resolving
    /// paths). Runs exactly once per build, after all customizations.
    fn process(&mut self, application: &Application) -> Result<(), BoxError>;

    /// Processed content, once [`process`](Self::process) has run.
    fn output(&self) -> Option<&str> {
        None
    }
}

/// Raw declaration of a module as discovered by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Root-relative logical path of the module.
    pub path: String,
    /// Root-relative files backing the module, in inclusion order.
    pub assets: Vec<PathBuf>,
    /// Whether the built module may be cached.
    pub persistent: bool,
}

impl ModuleDescriptor {
    /// Creates a persistent descriptor.
    pub fn new(path: impl Into<String>, assets: Vec<PathBuf>) -> Self {
        Self {
            path: path.into(),
            assets,
            persistent: true,
        }
    }

    /// Marks the descriptor as non-persistent when `persistent` is false.
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }
}

/// Constructs typed modules from raw declarations.
pub trait ModuleFactory<T: Module>: Send + Sync {
    /// Creates one module from `descriptor`.
    fn create_module(
        &self,
        descriptor: ModuleDescriptor,
        application: &Application,
    ) -> Result<T, BoxError>;
}

impl<T, F> ModuleFactory<T> for F
where
    T: Module,
    F: Fn(ModuleDescriptor, &Application) -> Result<T, BoxError> + Send + Sync,
{
    fn create_module(
        &self,
        descriptor: ModuleDescriptor,
        application: &Application,
    ) -> Result<T, BoxError> {
        self(descriptor, application)
    }
}
