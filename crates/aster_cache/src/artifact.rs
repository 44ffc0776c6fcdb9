//! Content-addressed binary artifact storage.
//!
//! Container payloads are stored as binary files in a subdirectory of the
//! per-type cache directory. Each artifact starts with a header containing
//! magic bytes, a format version and a checksum of the payload.

use std::path::{Path, PathBuf};

use aster_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Magic bytes identifying an Aster cache artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"ASTR";

/// Current artifact format version. Increment on breaking changes to
/// the header or payload format.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every cached artifact for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Magic bytes: must be `b"ASTR"`.
    pub magic: [u8; 4],

    /// Artifact format version.
    pub format_version: u32,

    /// Application version that produced this artifact.
    pub application_version: String,

    /// Content hash of the payload data.
    pub checksum: ContentHash,
}

/// Content-addressed store for binary artifacts.
///
/// Each artifact is stored at `<dir>/<subdir>/<key>.<ext>` where the key is
/// the content hash of the payload.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a new artifact store rooted at the given directory.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Ensures that the subdirectory for the given artifact type exists.
    pub fn ensure_dirs(&self, subdir: &str) -> Result<(), CacheError> {
        let dir = self.dir.join(subdir);
        std::fs::create_dir_all(&dir).map_err(CacheError::io(dir))
    }

    /// Returns the file path for an artifact with the given key.
    pub fn artifact_path(&self, subdir: &str, key: &str, ext: &str) -> PathBuf {
        self.dir.join(subdir).join(format!("{key}.{ext}"))
    }

    /// Writes an artifact to the store and returns its key.
    ///
    /// The file is written under a temporary name and renamed into place, so
    /// a concurrent reader sees either nothing or the complete artifact.
    pub fn write_artifact(
        &self,
        subdir: &str,
        ext: &str,
        data: &[u8],
        application_version: &str,
    ) -> Result<String, CacheError> {
        self.ensure_dirs(subdir)?;

        let checksum = ContentHash::from_bytes(data);
        let key = checksum.to_string();
        let path = self.artifact_path(subdir, &key, ext);

        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            application_version: application_version.to_string(),
            checksum,
        };

        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        // 4-byte header length (little-endian) + header + payload
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + data.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(data);

        write_atomic(&path, &output)?;
        Ok(key)
    }

    /// Reads an artifact from the store, validating its header and checksum.
    pub fn read_artifact(&self, subdir: &str, key: &str, ext: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.artifact_path(subdir, key, ext);
        let raw = std::fs::read(&path).map_err(CacheError::io(&path))?;

        let invalid = |reason: &str| CacheError::InvalidHeader {
            path: path.clone(),
            reason: reason.to_string(),
        };

        if raw.len() < 4 {
            return Err(invalid("file shorter than header length prefix"));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&raw[..4]);
        let header_len = u32::from_le_bytes(len_bytes) as usize;
        if raw.len() < 4 + header_len {
            return Err(invalid("truncated header"));
        }

        let (header, _): (ArtifactHeader, usize) =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .map_err(|e| invalid(&e.to_string()))?;

        if header.magic != ARTIFACT_MAGIC {
            return Err(invalid("bad magic bytes"));
        }
        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path,
                expected: ARTIFACT_FORMAT_VERSION,
                actual: header.format_version,
            });
        }

        let payload = &raw[4 + header_len..];
        let actual = ContentHash::from_bytes(payload);
        if actual != header.checksum {
            return Err(CacheError::ChecksumMismatch {
                path,
                expected: header.checksum.to_string(),
                actual: actual.to_string(),
            });
        }

        Ok(payload.to_vec())
    }

    /// Removes artifacts that are not in the set of live keys.
    ///
    /// Returns the number of files removed.
    pub fn gc(&self, subdir: &str, ext: &str, live_keys: &[&str]) -> Result<usize, CacheError> {
        let dir = self.dir.join(subdir);
        if !dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        let entries = std::fs::read_dir(&dir).map_err(CacheError::io(&dir))?;
        for entry in entries {
            let path = entry.map_err(CacheError::io(&dir))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !live_keys.contains(&stem) {
                    std::fs::remove_file(&path).map_err(CacheError::io(&path))?;
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }
}

/// Writes `data` to `path` through a sibling temporary file and a rename.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), CacheError> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    std::fs::write(&tmp, data).map_err(CacheError::io(&tmp))?;
    std::fs::rename(&tmp, path).map_err(CacheError::io(path))
}
