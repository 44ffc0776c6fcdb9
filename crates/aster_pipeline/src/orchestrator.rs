//! The configuration orchestrator.
//!
//! Holds a registry keyed by module type. Each entry is a generic
//! [`TypedEntry`] behind the non-generic [`RegistryEntry`] trait; the entry
//! created by the first `add` for a type fixes how that type is built, and
//! later `add` calls only merge into its result.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use aster_cache::ModuleCache;
use aster_common::BoxError;
use rayon::prelude::*;

use crate::application::Application;
use crate::container::{AnyContainer, ModuleContainer, ModuleContainers};
use crate::customize::{Customization, Customizations};
use crate::error::PipelineError;
use crate::module::{Module, ModuleFactory};
use crate::source::{ModuleSource, SourceResult};

/// Shared, read-only state for building containers.
struct BuildContext<'a> {
    application: &'a Application,
    cache_dir: &'a Path,
    customizations: &'a Customizations,
}

/// A registry entry with its module type erased.
trait RegistryEntry: Send + Sync {
    fn kind(&self) -> &'static str;

    fn module_count(&self) -> usize;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn build(
        &self,
        ctx: &BuildContext<'_>,
        use_cache: bool,
        application_version: &str,
    ) -> Result<Box<dyn AnyContainer>, PipelineError>;
}

/// The merged result for one module type and the way to build it.
struct TypedEntry<T> {
    result: SourceResult<T>,
}

impl<T: Module> TypedEntry<T> {
    /// Customizes and processes fresh copies of `modules`.
    fn prepare(&self, ctx: &BuildContext<'_>, mut modules: Vec<T>) -> Result<Vec<T>, PipelineError> {
        ctx.customizations.apply(&mut modules)?;
        for module in &mut modules {
            module
                .process(ctx.application)
                .map_err(|reason| PipelineError::Processing {
                    kind: T::KIND,
                    module: module.path().to_string(),
                    reason,
                })?;
        }
        Ok(modules)
    }

    fn build_fresh(&self, ctx: &BuildContext<'_>) -> Result<ModuleContainer<T>, PipelineError> {
        let modules = self.prepare(ctx, self.result.modules().to_vec())?;
        Ok(ModuleContainer::new(modules))
    }

    fn build_cached(
        &self,
        ctx: &BuildContext<'_>,
        application_version: &str,
    ) -> Result<ModuleContainer<T>, PipelineError> {
        let cache = ModuleCache::<T>::new(&ctx.cache_dir.join(T::KIND));
        let root_dir = ctx.application.root_dir();

        if cache.is_up_to_date(self.result.last_write_time_max(), application_version, root_dir) {
            let mut modules = cache
                .load_modules()
                .map_err(|source| PipelineError::CacheIntegrity {
                    kind: T::KIND,
                    source,
                })?;
            let volatile: Vec<T> = self
                .result
                .modules()
                .iter()
                .filter(|m| !m.is_persistent())
                .cloned()
                .collect();
            let cached = modules.len();
            modules.extend(self.prepare(ctx, volatile)?);
            tracing::info!(
                kind = T::KIND,
                cached,
                rebuilt = modules.len() - cached,
                "cache.hit"
            );
            return Ok(ModuleContainer::new(modules));
        }

        let container = self.build_fresh(ctx)?;
        cache
            .save_modules(
                container.iter().filter(|m| m.is_persistent()),
                application_version,
                root_dir,
            )
            .map_err(|source| PipelineError::CacheIntegrity {
                kind: T::KIND,
                source,
            })?;
        tracing::info!(
            kind = T::KIND,
            modules = container.len(),
            version = %application_version,
            "cache.rebuilt"
        );
        Ok(container)
    }
}

impl<T: Module> RegistryEntry for TypedEntry<T> {
    fn kind(&self) -> &'static str {
        T::KIND
    }

    fn module_count(&self) -> usize {
        self.result.len()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn build(
        &self,
        ctx: &BuildContext<'_>,
        use_cache: bool,
        application_version: &str,
    ) -> Result<Box<dyn AnyContainer>, PipelineError> {
        let container = if use_cache {
            self.build_cached(ctx, application_version)?
        } else {
            self.build_fresh(ctx)?
        };
        Ok(Box::new(container))
    }
}

/// Coordinates one configuration pass: collects module sources per type,
/// records customizations and builds the final containers.
///
/// Registration takes `&mut self` and is meant to run on one thread during
/// startup. Building takes `&self` and builds distinct module types in
/// parallel; each type is built start to finish on a single worker.
pub struct Orchestrator {
    application: Application,
    cache_dir: PathBuf,
    factories: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    entries: Vec<(TypeId, Box<dyn RegistryEntry>)>,
    index: HashMap<TypeId, usize>,
    customizations: Customizations,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<(&str, usize)> = self
            .entries
            .iter()
            .map(|(_, e)| (e.kind(), e.module_count()))
            .collect();
        f.debug_struct("Orchestrator")
            .field("application", &self.application)
            .field("cache_dir", &self.cache_dir)
            .field("factories", &self.factories.len())
            .field("entries", &entries)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator for `application` caching under `cache_dir`.
    pub fn new(application: Application, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            application,
            cache_dir: cache_dir.into(),
            factories: HashMap::new(),
            entries: Vec::new(),
            index: HashMap::new(),
            customizations: Customizations::new(),
        }
    }

    /// The application this pass builds for.
    pub fn application(&self) -> &Application {
        &self.application
    }

    /// The directory per-type caches live under.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Registers the factory sources use to construct modules of type `T`.
    /// A later registration for the same type replaces the earlier one.
    pub fn register_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Module,
        F: ModuleFactory<T> + 'static,
    {
        let factory: Box<dyn ModuleFactory<T>> = Box::new(factory);
        self.factories.insert(TypeId::of::<T>(), Box::new(factory));
        self
    }

    fn factory<T: Module>(&self) -> Result<&dyn ModuleFactory<T>, PipelineError> {
        self.factories
            .get(&TypeId::of::<T>())
            .and_then(|f| f.downcast_ref::<Box<dyn ModuleFactory<T>>>())
            .map(|f| f.as_ref())
            .ok_or(PipelineError::MissingFactory { kind: T::KIND })
    }

    /// Adds one source for `T`, merging its result into any earlier
    /// contributions for the same type.
    pub fn add<T, S>(&mut self, source: S) -> Result<&mut Self, PipelineError>
    where
        T: Module,
        S: ModuleSource<T>,
    {
        let result = {
            let factory = self.factory::<T>()?;
            source
                .get_modules(factory, &self.application)
                .map_err(|reason: BoxError| PipelineError::Source {
                    kind: T::KIND,
                    source_name: source.describe(),
                    reason,
                })?
        };
        tracing::debug!(
            kind = T::KIND,
            source = %source.describe(),
            modules = result.len(),
            "sources.added"
        );
        self.merge_result(result);
        Ok(self)
    }

    /// Adds several sources for `T`, in order.
    pub fn add_all<T, S, I>(&mut self, sources: I) -> Result<&mut Self, PipelineError>
    where
        T: Module,
        S: ModuleSource<T>,
        I: IntoIterator<Item = S>,
    {
        for source in sources {
            self.add::<T, S>(source)?;
        }
        Ok(self)
    }

    fn merge_result<T: Module>(&mut self, result: SourceResult<T>) {
        let type_id = TypeId::of::<T>();
        if let Some(&i) = self.index.get(&type_id) {
            if let Some(entry) = self.entries[i].1.as_any_mut().downcast_mut::<TypedEntry<T>>() {
                let existing = std::mem::take(&mut entry.result);
                entry.result = existing.merge(result);
            }
            return;
        }
        self.index.insert(type_id, self.entries.len());
        self.entries
            .push((type_id, Box::new(TypedEntry { result })));
    }

    /// Returns `true` if any source has been added for `T`.
    pub fn contains_module_sources<T: Module>(&self) -> bool {
        self.contains_module_sources_of(TypeId::of::<T>())
    }

    /// Returns `true` if any source has been added for the given type id.
    pub fn contains_module_sources_of(&self, type_id: TypeId) -> bool {
        self.index.contains_key(&type_id)
    }

    /// Number of modules currently registered for `T`.
    pub fn module_count<T: Module>(&self) -> usize {
        self.index
            .get(&TypeId::of::<T>())
            .map(|&i| self.entries[i].1.module_count())
            .unwrap_or(0)
    }

    /// Registers an infallible customization applied to every module of `T`.
    pub fn customize<T, A>(&mut self, action: A) -> &mut Self
    where
        T: Module,
        A: Fn(&mut T) + Send + Sync + 'static,
    {
        self.customizations.push(Customization::always(move |m: &mut T| {
            action(m);
            Ok(())
        }));
        self
    }

    /// Registers an infallible customization for modules of `T` matching
    /// `predicate`.
    pub fn customize_where<T, P, A>(&mut self, predicate: P, action: A) -> &mut Self
    where
        T: Module,
        P: Fn(&T) -> bool + Send + Sync + 'static,
        A: Fn(&mut T) + Send + Sync + 'static,
    {
        self.customizations.push(Customization::when(predicate, move |m: &mut T| {
            action(m);
            Ok(())
        }));
        self
    }

    /// Registers a fallible customization for every module of `T`.
    pub fn try_customize<T, A>(&mut self, action: A) -> &mut Self
    where
        T: Module,
        A: Fn(&mut T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.customizations.push(Customization::always(action));
        self
    }

    /// Registers a fallible customization for modules of `T` matching
    /// `predicate`.
    pub fn try_customize_where<T, P, A>(&mut self, predicate: P, action: A) -> &mut Self
    where
        T: Module,
        P: Fn(&T) -> bool + Send + Sync + 'static,
        A: Fn(&mut T) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.customizations.push(Customization::when(predicate, action));
        self
    }

    /// Builds one container per registered module type.
    ///
    /// With `use_cache` false every type is customized and processed from
    /// scratch and nothing is written to disk. With `use_cache` true each
    /// type's cache is consulted: a valid snapshot is loaded and the type's
    /// non-persistent modules are rebuilt and appended; otherwise the type is
    /// rebuilt and the snapshot replaced. Any failure fails the whole call.
    pub fn create_module_containers(
        &self,
        use_cache: bool,
        application_version: &str,
    ) -> Result<ModuleContainers, PipelineError> {
        let ctx = BuildContext {
            application: &self.application,
            cache_dir: &self.cache_dir,
            customizations: &self.customizations,
        };

        tracing::info!(
            types = self.entries.len(),
            use_cache,
            version = %application_version,
            "containers.build"
        );

        let built = self
            .entries
            .par_iter()
            .map(|(type_id, entry)| {
                let _span = tracing::info_span!("build_container", kind = entry.kind()).entered();
                entry
                    .build(&ctx, use_cache, application_version)
                    .map(|container| (*type_id, container))
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(ModuleContainers::new(built))
    }
}
