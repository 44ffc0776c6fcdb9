//! Stylesheet compiler contract and the process-wide compiler handle.
//!
//! A [`CompilerEngine`] is the raw, non-reentrant compiler: it takes
//! `&mut self`. [`Serialized`] wraps an engine in a mutex and exposes it as a
//! shareable [`StylesheetCompiler`], so at most one compilation runs inside
//! the engine at a time even when module types are built in parallel.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use crate::css::CssCompiler;
use crate::error::CompileError;

/// Where a compilation happens and how its output should look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileContext {
    /// Absolute path of the file being compiled, for diagnostics and
    /// reference discovery.
    pub source_file: PathBuf,
    /// Directory relative imports are resolved against.
    pub base_dir: PathBuf,
    /// Produce minified output.
    pub minify: bool,
}

impl CompileContext {
    /// Creates a context for `source_file`, resolving imports next to it.
    pub fn for_file(source_file: impl Into<PathBuf>) -> Self {
        let source_file = source_file.into();
        let base_dir = source_file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        Self {
            source_file,
            base_dir,
            minify: false,
        }
    }
}

/// The result of compiling one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Compiled CSS.
    pub css: String,
    /// Files the output depends on: the source file first, then every file
    /// reached through `@import`.
    pub references: Vec<PathBuf>,
}

/// A raw compiler that must not be entered concurrently.
pub trait CompilerEngine: Send {
    /// Compiles `source` in `context`.
    fn compile(&mut self, source: &str, context: &CompileContext)
        -> Result<CompileOutput, CompileError>;
}

/// A compiler that may be shared between threads.
pub trait StylesheetCompiler: Send + Sync {
    /// Compiles `source` in `context`.
    fn compile(&self, source: &str, context: &CompileContext) -> Result<CompileOutput, CompileError>;
}

/// Serializes every call into the wrapped engine behind one mutex.
pub struct Serialized<E> {
    engine: Mutex<E>,
}

impl<E: CompilerEngine> Serialized<E> {
    /// Wraps `engine`.
    pub fn new(engine: E) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }
}

impl<E: CompilerEngine> StylesheetCompiler for Serialized<E> {
    fn compile(&self, source: &str, context: &CompileContext) -> Result<CompileOutput, CompileError> {
        let mut engine = self.engine.lock().map_err(|_| CompileError::Poisoned)?;
        engine.compile(source, context)
    }
}

static SHARED: OnceLock<Arc<dyn StylesheetCompiler>> = OnceLock::new();

/// Installs the process-wide compiler, returning the one in effect.
///
/// Only the first installation takes effect; later calls (and calls after
/// [`shared_compiler`] has initialised the default) return the existing
/// handle unchanged.
pub fn install_compiler(compiler: Arc<dyn StylesheetCompiler>) -> Arc<dyn StylesheetCompiler> {
    SHARED.get_or_init(|| compiler).clone()
}

/// Returns the process-wide compiler, initialising it on first use with a
/// serialized [`CssCompiler`].
pub fn shared_compiler() -> Arc<dyn StylesheetCompiler> {
    SHARED
        .get_or_init(|| {
            tracing::debug!("stylesheet compiler initialised");
            Arc::new(Serialized::new(CssCompiler::default()))
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Detects overlapping calls.
    struct Reentrancy {
        inside: Arc<AtomicBool>,
        overlaps: Arc<AtomicUsize>,
    }

    impl CompilerEngine for Reentrancy {
        fn compile(
            &mut self,
            source: &str,
            context: &CompileContext,
        ) -> Result<CompileOutput, CompileError> {
            if self.inside.swap(true, Ordering::SeqCst) {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_millis(2));
            self.inside.store(false, Ordering::SeqCst);
            Ok(CompileOutput {
                css: source.to_string(),
                references: vec![context.source_file.clone()],
            })
        }
    }

    #[test]
    fn context_base_dir_is_parent() {
        let ctx = CompileContext::for_file("/site/styles/main.css");
        assert_eq!(ctx.base_dir, PathBuf::from("/site/styles"));
        assert!(!ctx.minify);
    }

    #[test]
    fn serialized_never_overlaps() {
        let overlaps = Arc::new(AtomicUsize::new(0));
        let compiler = Arc::new(Serialized::new(Reentrancy {
            inside: Arc::new(AtomicBool::new(false)),
            overlaps: overlaps.clone(),
        }));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let compiler = compiler.clone();
                thread::spawn(move || {
                    let ctx = CompileContext::for_file(format!("/s/{i}.css"));
                    compiler.compile("a{}", &ctx).unwrap()
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().css, "a{}");
        }
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shared_handle_is_stable() {
        let a = shared_compiler();
        let b = shared_compiler();
        assert!(Arc::ptr_eq(&a, &b));

        let other: Arc<dyn StylesheetCompiler> = Arc::new(Serialized::new(CssCompiler::default()));
        let installed = install_compiler(other.clone());
        assert!(Arc::ptr_eq(&installed, &a));
        assert!(!Arc::ptr_eq(&installed, &other));
    }
}
