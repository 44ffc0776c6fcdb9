//! Common error types for the Aster pipeline.

/// Error type returned by user-supplied callbacks (sources, factories,
/// customizations, module processing) whose failure is wrapped by the
/// orchestrator with context.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
