//! Error types for building module containers.

use aster_cache::CacheError;
use aster_common::BoxError;

/// Errors that fail a configuration pass.
///
/// Every variant names the module type (its [`KIND`](crate::Module::KIND));
/// module-level failures also name the module path. A cache miss is never an
/// error: only reads of a snapshot already judged valid, and writes, are.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A source was added for a type that has no registered factory.
    #[error("no module factory registered for {kind}")]
    MissingFactory {
        /// The module type.
        kind: &'static str,
    },

    /// A module source could not produce its modules.
    #[error("{kind}: module source {source_name} failed: {reason}")]
    Source {
        /// The module type.
        kind: &'static str,
        /// Description of the failing source.
        source_name: String,
        /// The underlying failure.
        #[source]
        reason: BoxError,
    },

    /// A registered customization failed while being applied.
    #[error("{kind}: customization failed on module '{module}': {reason}")]
    Customization {
        /// The module type.
        kind: &'static str,
        /// Path of the module being customized.
        module: String,
        /// The underlying failure.
        #[source]
        reason: BoxError,
    },

    /// A module's own processing step failed.
    #[error("{kind}: processing failed for module '{module}': {reason}")]
    Processing {
        /// The module type.
        kind: &'static str,
        /// Path of the module being processed.
        module: String,
        /// The underlying failure.
        #[source]
        reason: BoxError,
    },

    /// Reading a valid snapshot or writing a new one failed.
    #[error("{kind}: cache integrity failure: {source}")]
    CacheIntegrity {
        /// The module type.
        kind: &'static str,
        /// The underlying cache error.
        source: CacheError,
    },
}

impl PipelineError {
    /// Returns the module type the error belongs to.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MissingFactory { kind }
            | PipelineError::Source { kind, .. }
            | PipelineError::Customization { kind, .. }
            | PipelineError::Processing { kind, .. }
            | PipelineError::CacheIntegrity { kind, .. } => *kind,
        }
    }
}
