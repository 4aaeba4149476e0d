//! Advisory manifest lock
//!
//! An exclusive `flock`-style lock on a `<manifest>.lock` sidecar, never on
//! the manifest itself: the manifest is replaced by rename on write, which
//! would orphan a lock held on its old inode.

use crate::error::StoreError;
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Sidecar lock path for a manifest
#[must_use]
pub fn lock_path(manifest: &Path) -> PathBuf {
    let mut path: OsString = manifest.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

/// Held exclusive lock; released on drop
///
/// The sidecar file is left on disk after release. Removing it would let a
/// waiting process lock an unlinked inode while a third creates a new one.
#[derive(Debug)]
pub struct ManifestLock {
    path: PathBuf,
    file: File,
}

impl ManifestLock {
    /// Try to take the lock for `manifest` without blocking
    ///
    /// # Errors
    /// - `LockBusy` if another holder has it
    /// - `Io` if the sidecar cannot be opened or locked
    pub fn acquire(manifest: &Path) -> Result<Self, StoreError> {
        let path = lock_path(manifest);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                tracing::debug!(lock = %path.display(), "manifest lock acquired");
                Ok(Self { path, file })
            }
            Err(err) if is_contended(&err) => Err(StoreError::lock_busy(&path)),
            Err(err) => Err(StoreError::io(&path, err)),
        }
    }

    /// Sidecar file holding the lock
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(lock = %self.path.display(), error = %err, "failed to release manifest lock");
        } else {
            tracing::debug!(lock = %self.path.display(), "manifest lock released");
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || (err.raw_os_error().is_some()
            && err.raw_os_error() == fs2::lock_contended_error().raw_os_error())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_appends_suffix() {
        assert_eq!(
            lock_path(Path::new("App.xcodeproj/project.pbxproj")),
            PathBuf::from("App.xcodeproj/project.pbxproj.lock")
        );
    }

    #[test]
    fn contended_error_is_recognised() {
        assert!(is_contended(&fs2::lock_contended_error()));
        assert!(!is_contended(&io::Error::new(io::ErrorKind::NotFound, "gone")));
    }
}
