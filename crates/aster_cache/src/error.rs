//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Validity checks never surface these: a missing or damaged snapshot is
/// reported as "not up to date". They are returned when reading a snapshot
/// that was already judged valid, or when writing a new one fails.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading or writing a cache file failed.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// No manifest exists for the requested cache directory.
    #[error("no cached snapshot in {path}")]
    MissingSnapshot {
        /// The cache directory that was queried.
        path: PathBuf,
    },

    /// An artifact file has an invalid or missing header.
    #[error("invalid artifact header in {path}: {reason}")]
    InvalidHeader {
        /// The artifact file path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The payload does not hash to the checksum recorded in its header.
    #[error("payload checksum mismatch in {path}: header says {expected}, payload hashes to {actual}")]
    ChecksumMismatch {
        /// The artifact file path.
        path: PathBuf,
        /// The expected checksum from the header.
        expected: String,
        /// The actual checksum computed from the payload.
        actual: String,
    },

    /// The artifact was written in a different format version.
    #[error("artifact format {actual} in {path} is not the supported format {expected}")]
    VersionMismatch {
        /// The artifact file path.
        path: PathBuf,
        /// The expected format version.
        expected: u32,
        /// The actual format version found in the file.
        actual: u32,
    },

    /// The module list or manifest could not be encoded or decoded.
    #[error("failed to encode or decode cached modules: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }
}
