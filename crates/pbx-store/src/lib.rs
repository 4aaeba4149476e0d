//! File boundary for manifest edits
//!
//! Wraps the pure insertion core with everything that touches the disk:
//! an advisory lock on a sidecar file, a whole-file read, and an atomic
//! whole-file write. On `AlreadyPresent` or on any failure the manifest is
//! left exactly as it was.
//!
//! # Example
//!
//! ```rust,ignore
//! use pbx_store::{apply_in_place, ApplyOptions};
//!
//! let mut engine = Engine::new();
//! let result = apply_in_place(&path, ApplyOptions::default(), |text| engine.apply(text, &plan))?;
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod error;
pub mod lock;
pub mod store;

// Re-exports
pub use error::StoreError;
pub use lock::{lock_path, ManifestLock};
pub use store::{
    apply_in_place, mutate_in_place, read_all, resolve_manifest_path, write_all, ApplyOptions,
    Mutation, MANIFEST_FILE_NAME,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
