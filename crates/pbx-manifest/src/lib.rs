//! Manifest insertion core
//!
//! Registers a new file in an Xcode project manifest by inserting one
//! record into each of four coordinated sections, every record tied to the
//! others by freshly minted identifiers. The manifest is never parsed:
//! each record is spliced in right after the matching record of a known
//! neighbour (the *anchor*).
//!
//! # Core Concepts
//!
//! - [`is_present`]: idempotency gate; a known name means nothing to do
//! - [`IdMinter`]: collision-checked [`ObjectId`] synthesis
//! - [`Insertion`] / [`insert`]: exactly-one-anchor splice for one section
//! - [`Engine`]: the whole run, returning an [`InsertOutcome`]
//! - [`verify_references`]: audit of the minted cross-references
//!
//! # Example
//!
//! ```rust,ignore
//! use pbx_manifest::prelude::*;
//!
//! let plan = InsertionPlan::new(
//!     Entity::new("B.swift")?,
//!     AnchorEntity::new("A.swift", "3D9B1A0F1234567890123456".parse()?)?,
//! )
//! .with_target(TargetSpec::new("App", "3D9B1A0E1234567890123456".parse()?));
//!
//! match Engine::new().apply(&text, &plan)? {
//!     InsertOutcome::Added(report) => write_back(report.text),
//!     InsertOutcome::AlreadyPresent { .. } => {}
//! }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod engine;
pub mod entity;
pub mod error;
pub mod id;
pub mod insert;
pub mod presence;
pub mod section;
pub mod verify;

// Re-exports
pub use engine::{AppliedInsertion, Engine, InsertOutcome, InsertReport, InsertionPlan};
pub use entity::{file_type_for, quote_value, AnchorEntity, Entity, TargetSpec};
pub use error::InsertError;
pub use id::{IdError, IdMinter, MintedIds, ObjectId, TargetId};
pub use insert::{insert, splice, Splice};
pub use presence::is_present;
pub use section::{AnchorPattern, Insertion, SectionKind};
pub use verify::{verify_references, ReferenceAudit, ReferenceProblem};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving an insertion
    pub use crate::engine::{Engine, InsertOutcome, InsertReport, InsertionPlan};
    pub use crate::entity::{AnchorEntity, Entity, TargetSpec};
    pub use crate::error::InsertError;
    pub use crate::id::{IdMinter, MintedIds, ObjectId};
}
