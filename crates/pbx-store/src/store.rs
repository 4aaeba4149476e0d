//! Read-all / write-all around the insertion core
//!
//! ```text
//! lock → read → mutate (pure) → write if changed and not dry run → unlock
//! ```
//!
//! Writes go through a temp file and rename, so readers see either the old
//! manifest or the new one.

use crate::error::StoreError;
use crate::lock::ManifestLock;
use atomic_write_file::AtomicWriteFile;
use pbx_manifest::{InsertError, InsertOutcome};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Manifest file name inside an `.xcodeproj` bundle
pub const MANIFEST_FILE_NAME: &str = "project.pbxproj";

/// Resolve a project argument to the manifest file
///
/// Accepts the manifest itself or the bundle directory containing it.
///
/// # Errors
/// Returns `NotAManifest` for a directory without a manifest
pub fn resolve_manifest_path(path: &Path) -> Result<PathBuf, StoreError> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }
    let manifest = path.join(MANIFEST_FILE_NAME);
    if manifest.is_file() {
        Ok(manifest)
    } else {
        Err(StoreError::NotAManifest {
            path: path.to_path_buf(),
        })
    }
}

/// Read the whole manifest as text
///
/// # Errors
/// - `Io` if the file cannot be read
/// - `NotUtf8` if it is not UTF-8
pub fn read_all(path: &Path) -> Result<String, StoreError> {
    let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| StoreError::NotUtf8 {
        path: path.to_path_buf(),
    })
}

/// Replace the whole manifest atomically
///
/// # Errors
/// Returns `Io` if the temp file cannot be written or renamed into place
pub fn write_all(path: &Path, text: &str) -> Result<(), StoreError> {
    let mut file = AtomicWriteFile::open(path).map_err(|e| StoreError::io(path, e))?;
    file.write_all(text.as_bytes())
        .map_err(|e| StoreError::io(path, e))?;
    file.commit().map_err(|e| StoreError::io(path, e))?;
    tracing::info!(path = %path.display(), bytes = text.len(), "manifest written");
    Ok(())
}

/// How a locked mutation is carried out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Compute the result but never write
    pub dry_run: bool,
}

impl ApplyOptions {
    /// Options for a dry run
    #[inline]
    #[must_use]
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

/// Result of a locked mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<T> {
    /// Value returned by the mutator
    pub value: T,
    /// Whether the file on disk was replaced
    pub written: bool,
}

/// Run one lock-scoped read-modify-write on `path`
///
/// The mutator gets the current text and returns a value plus the new text,
/// or `None` when nothing changed. The file is written only for `Some` text
/// that differs from the original, and never in a dry run.
///
/// The error type is the caller's: anything a [`StoreError`] converts into,
/// so the mutator can fail with its own errors.
///
/// # Errors
/// Lock, read and write failures, plus the mutator's own error; the file is
/// untouched in every error case
pub fn mutate_in_place<T, E, F>(path: &Path, options: ApplyOptions, mutator: F) -> Result<Mutation<T>, E>
where
    F: FnOnce(&str) -> Result<(T, Option<String>), E>,
    E: From<StoreError>,
{
    let _lock = ManifestLock::acquire(path)?;
    let before = read_all(path)?;
    let (value, after) = mutator(&before)?;

    let written = match after {
        Some(text) if text != before => {
            if options.dry_run {
                tracing::info!(path = %path.display(), "dry run, not writing");
                false
            } else {
                write_all(path, &text)?;
                true
            }
        }
        _ => false,
    };
    Ok(Mutation { value, written })
}

/// Run the insertion engine against the manifest at `path`
///
/// # Errors
/// See [`mutate_in_place`]; anchor and identifier failures surface as
/// [`StoreError::Insert`]
pub fn apply_in_place<F>(
    path: &Path,
    options: ApplyOptions,
    run: F,
) -> Result<Mutation<InsertOutcome>, StoreError>
where
    F: FnOnce(&str) -> Result<InsertOutcome, InsertError>,
{
    mutate_in_place(path, options, |text| {
        let outcome = run(text)?;
        let new_text = outcome.text().map(str::to_string);
        Ok::<_, StoreError>((outcome, new_text))
    })
}
