//! File modification-time helpers.
//!
//! Sources report the latest modification time among their backing files so
//! the module cache can decide whether a persisted container is stale.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The earliest representable modification time, used for empty results.
pub const EPOCH: SystemTime = SystemTime::UNIX_EPOCH;

/// Returns the last modification time of a single file or directory.
pub fn modified_time(path: &Path) -> io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

/// Returns the latest modification time among `paths`, or [`EPOCH`] when
/// the slice is empty.
///
/// Unlike content hashing, a missing file is an error here: a source that
/// claims a file it cannot stat has produced an inconsistent result.
pub fn latest_modification(paths: &[PathBuf]) -> io::Result<SystemTime> {
    let mut latest = EPOCH;
    for path in paths {
        latest = latest.max(modified_time(path)?);
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn empty_is_epoch() {
        assert_eq!(latest_modification(&[]).unwrap(), EPOCH);
    }

    #[test]
    fn latest_of_several_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();

        let latest = latest_modification(&[a.clone(), b.clone()]).unwrap();
        let ta = modified_time(&a).unwrap();
        let tb = modified_time(&b).unwrap();
        assert_eq!(latest, ta.max(tb));
        assert!(latest > EPOCH + Duration::from_secs(1));
    }

    #[test]
    fn missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.css");
        assert!(latest_modification(&[missing]).is_err());
    }
}
