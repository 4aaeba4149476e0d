//! Error types for the file boundary

use pbx_manifest::InsertError;
use std::path::{Path, PathBuf};

/// Errors raised while reading, locking or writing a manifest
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem error
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the manifest lock
    #[error("manifest lock busy: {path}")]
    LockBusy { path: PathBuf },

    /// File is not valid UTF-8
    #[error("not valid UTF-8: {path}")]
    NotUtf8 { path: PathBuf },

    /// Path does not name a manifest
    #[error("no project manifest at {path}")]
    NotAManifest { path: PathBuf },

    /// The insertion itself failed; the file was left untouched
    #[error(transparent)]
    Insert(#[from] InsertError),
}

impl StoreError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create lock-busy error for the lock file
    pub fn lock_busy(path: &Path) -> Self {
        Self::LockBusy {
            path: path.to_path_buf(),
        }
    }

    /// Whether the lock was held elsewhere
    #[inline]
    #[must_use]
    pub fn is_lock_busy(&self) -> bool {
        matches!(self, Self::LockBusy { .. })
    }

    /// Whether this wraps an anchor or identifier failure of the core
    #[inline]
    #[must_use]
    pub fn is_insert_failure(&self) -> bool {
        matches!(self, Self::Insert(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_errors_display_transparently() {
        let err = StoreError::from(InsertError::anchor_not_found("PBXGroup", "X /* A.swift */,"));
        assert!(err.is_insert_failure());
        assert_eq!(err.to_string(), "PBXGroup: anchor not found: X /* A.swift */,");
    }

    #[test]
    fn lock_busy_names_lock_file() {
        let err = StoreError::lock_busy(Path::new("/tmp/project.pbxproj.lock"));
        assert!(err.is_lock_busy());
        assert_eq!(err.to_string(), "manifest lock busy: /tmp/project.pbxproj.lock");
    }
}
