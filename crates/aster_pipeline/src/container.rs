//! Immutable containers of processed modules.

use std::any::{Any, TypeId};
use std::fmt;

use crate::module::Module;

/// The final, immutable, ordered set of processed modules of one type.
///
/// There is no way to mutate a container once built; a rebuild produces a
/// new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleContainer<T> {
    modules: Vec<T>,
}

impl<T: Module> ModuleContainer<T> {
    /// Wraps already-processed modules.
    pub fn new(modules: Vec<T>) -> Self {
        Self { modules }
    }

    /// The modules, in order.
    pub fn modules(&self) -> &[T] {
        &self.modules
    }

    /// Iterates over the modules in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.modules.iter()
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if the container holds no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Finds a module by its path. A leading `~/` (application-root marker)
    /// and trailing slashes are ignored on both sides.
    pub fn find_by_path(&self, path: &str) -> Option<&T> {
        let wanted = normalize_path(path);
        self.modules
            .iter()
            .find(|m| normalize_path(m.path()) == wanted)
    }

    /// Returns `true` if a module with the given path exists.
    pub fn contains(&self, path: &str) -> bool {
        self.find_by_path(path).is_some()
    }
}

impl<'a, T: Module> IntoIterator for &'a ModuleContainer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

fn normalize_path(path: &str) -> &str {
    path.trim_start_matches("~/").trim_end_matches('/')
}

/// Type-erased view of a [`ModuleContainer`], for callers that handle every
/// module type uniformly (reporting, writing outputs).
pub trait AnyContainer: Send + Sync {
    /// The module type's [`KIND`](Module::KIND).
    fn kind(&self) -> &'static str;

    /// Number of modules.
    fn len(&self) -> usize;

    /// Returns `true` if the container holds no modules.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Module paths, in order.
    fn paths(&self) -> Vec<&str>;

    /// `(path, processed output)` pairs, in order.
    fn outputs(&self) -> Vec<(&str, Option<&str>)>;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Module> AnyContainer for ModuleContainer<T> {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn len(&self) -> usize {
        self.modules.len()
    }

    fn paths(&self) -> Vec<&str> {
        self.modules.iter().map(Module::path).collect()
    }

    fn outputs(&self) -> Vec<(&str, Option<&str>)> {
        self.modules.iter().map(|m| (m.path(), m.output())).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The containers produced by one configuration pass, one per module type,
/// in registration order.
#[derive(Default)]
pub struct ModuleContainers {
    containers: Vec<(TypeId, Box<dyn AnyContainer>)>,
}

impl ModuleContainers {
    pub(crate) fn new(containers: Vec<(TypeId, Box<dyn AnyContainer>)>) -> Self {
        Self { containers }
    }

    /// The container for module type `T`, if `T` was registered.
    pub fn get<T: Module>(&self) -> Option<&ModuleContainer<T>> {
        self.get_by_type_id(TypeId::of::<T>())
            .and_then(|c| c.as_any().downcast_ref::<ModuleContainer<T>>())
    }

    /// The erased container for a type id.
    pub fn get_by_type_id(&self, type_id: TypeId) -> Option<&dyn AnyContainer> {
        self.containers
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, c)| c.as_ref())
    }

    /// Returns `true` if a container for `T` exists.
    pub fn contains<T: Module>(&self) -> bool {
        self.get_by_type_id(TypeId::of::<T>()).is_some()
    }

    /// Iterates over all containers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn AnyContainer> {
        self.containers.iter().map(|(_, c)| c.as_ref())
    }

    /// Number of containers (module types).
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Returns `true` if no module type was registered.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

impl fmt::Debug for ModuleContainers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|c| (c.kind(), c.len())))
            .finish()
    }
}
