//! Typed module registry, merge, customization and cache orchestration.
//!
//! Module sources contribute [`SourceResult`]s for a module type; repeated
//! contributions for the same type are merged in call order. When containers
//! are requested, the [`Orchestrator`] either reuses a valid persisted
//! snapshot or customizes, processes and persists a fresh build, producing
//! one immutable [`ModuleContainer`] per registered type.

#![warn(missing_docs)]

pub mod application;
pub mod container;
pub mod customize;
pub mod error;
pub mod module;
pub mod orchestrator;
pub mod source;

pub use application::{Application, Settings};
pub use container::{AnyContainer, ModuleContainer, ModuleContainers};
pub use customize::{Customization, Customizations};
pub use error::PipelineError;
pub use module::{Module, ModuleDescriptor, ModuleFactory};
pub use orchestrator::Orchestrator;
pub use source::{ModuleSource, SourceResult};

pub use aster_common::BoxError;
