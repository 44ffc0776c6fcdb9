//! Module sources and the results they contribute.

use std::time::SystemTime;

use aster_common::{BoxError, EPOCH};

use crate::application::Application;
use crate::module::{Module, ModuleFactory};

/// The outcome of one or more source contributions for a module type.
///
/// Carries the modules in contribution order and the latest modification
/// time among their backing inputs, which is all the cache needs to decide
/// validity.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResult<T> {
    modules: Vec<T>,
    last_write_time_max: SystemTime,
}

impl<T> SourceResult<T> {
    /// Creates a result from modules and their newest input time.
    pub fn new(modules: Vec<T>, last_write_time_max: SystemTime) -> Self {
        Self {
            modules,
            last_write_time_max,
        }
    }

    /// A result with no modules and the earliest possible timestamp.
    pub fn empty() -> Self {
        Self::new(Vec::new(), EPOCH)
    }

    /// The modules, in contribution order.
    pub fn modules(&self) -> &[T] {
        &self.modules
    }

    /// The newest modification time among the backing inputs.
    pub fn last_write_time_max(&self) -> SystemTime {
        self.last_write_time_max
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if there are no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Combines two results: `self`'s modules followed by `other`'s, and the
    /// later of the two timestamps.
    pub fn merge(mut self, other: SourceResult<T>) -> SourceResult<T> {
        self.modules.extend(other.modules);
        self.last_write_time_max = self.last_write_time_max.max(other.last_write_time_max);
        self
    }
}

impl<T> Default for SourceResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// A contributor of modules for one module type.
pub trait ModuleSource<T: Module> {
    /// Discovers raw inputs and turns them into modules with `factory`.
    fn get_modules(
        &self,
        factory: &dyn ModuleFactory<T>,
        application: &Application,
    ) -> Result<SourceResult<T>, BoxError>;

    /// Human-readable description used in error reports.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}
