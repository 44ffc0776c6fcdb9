//! Error types for bundle discovery and processing.

use std::path::PathBuf;

/// Errors raised while discovering or processing bundles.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// An asset file could not be read.
    #[error("failed to read asset {path}: {source}")]
    ReadAsset {
        /// Absolute path of the asset.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A source's glob pattern is malformed.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as configured.
        pattern: String,
        /// Description of the problem.
        reason: String,
    },

    /// A directory could not be listed or a matched path inspected.
    #[error("failed to scan {path}: {source}")]
    Scan {
        /// The path being scanned.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stylesheet failed to compile.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Errors reported by a stylesheet compiler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The source could not be parsed.
    #[error("error in {file}: {message}")]
    Syntax {
        /// The file being compiled.
        file: PathBuf,
        /// The compiler's diagnostic.
        message: String,
    },

    /// The parsed stylesheet could not be minified or printed.
    #[error("failed to emit {file}: {message}")]
    Emit {
        /// The file being compiled.
        file: PathBuf,
        /// The compiler's diagnostic.
        message: String,
    },

    /// A previous compilation panicked while holding the compiler lock.
    #[error("stylesheet compiler is unavailable after an earlier panic")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_names_file() {
        let err = CompileError::Syntax {
            file: PathBuf::from("styles/site.css"),
            message: "Unexpected token".to_string(),
        };
        assert_eq!(err.to_string(), "error in styles/site.css: Unexpected token");
    }

    #[test]
    fn compile_error_is_transparent() {
        let err: BundleError = CompileError::Poisoned.into();
        assert_eq!(err.to_string(), CompileError::Poisoned.to_string());
    }

    #[test]
    fn read_asset_display() {
        let err = BundleError::ReadAsset {
            path: PathBuf::from("/site/scripts/app.js"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/site/scripts/app.js"));
    }
}
