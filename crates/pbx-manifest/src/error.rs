//! Error types for manifest insertion
//!
//! `AlreadyPresent` is deliberately absent: it is an outcome
//! ([`crate::InsertOutcome::AlreadyPresent`]), not a failure.

use crate::id::{IdError, ObjectId};
use crate::verify::ReferenceAudit;

/// Errors raised while planning or applying an insertion
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    /// Anchor record text not found in its section
    #[error("{section}: anchor not found: {anchor}")]
    AnchorNotFound { section: String, anchor: String },

    /// Anchor record text matched more than once
    #[error("{section}: anchor matched {matches} times, expected exactly one: {anchor}")]
    AmbiguousAnchor {
        section: String,
        anchor: String,
        matches: usize,
    },

    /// A synthesized or pinned identifier already exists
    #[error("identifier collision: {id} ({role}) already exists")]
    IdentifierCollision { id: ObjectId, role: String },

    /// Entity or anchor cannot be embedded in a record
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// Plan is inconsistent (no targets, duplicate target names, ...)
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// Malformed identifier
    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdError),

    /// Anchor pattern failed to compile
    #[error("anchor pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Post-insertion audit found broken cross-references
    #[error("reference audit failed: {0}")]
    Unverified(ReferenceAudit),
}

impl InsertError {
    /// Create anchor-not-found error
    pub fn anchor_not_found(section: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self::AnchorNotFound {
            section: section.into(),
            anchor: anchor.into(),
        }
    }

    /// Create ambiguous-anchor error
    pub fn ambiguous_anchor(
        section: impl Into<String>,
        anchor: impl Into<String>,
        matches: usize,
    ) -> Self {
        Self::AmbiguousAnchor {
            section: section.into(),
            anchor: anchor.into(),
            matches,
        }
    }

    /// Create identifier collision error
    pub fn identifier_collision(id: ObjectId, role: impl Into<String>) -> Self {
        Self::IdentifierCollision {
            id,
            role: role.into(),
        }
    }

    /// Anchor could not be resolved to exactly one location
    #[inline]
    #[must_use]
    pub fn is_anchor_failure(&self) -> bool {
        matches!(
            self,
            Self::AnchorNotFound { .. } | Self::AmbiguousAnchor { .. }
        )
    }

    /// Identifier collision
    #[inline]
    #[must_use]
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::IdentifierCollision { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_not_found_display() {
        let err = InsertError::anchor_not_found("PBXGroup", "ABC /* A.swift */,");
        assert_eq!(
            err.to_string(),
            "PBXGroup: anchor not found: ABC /* A.swift */,"
        );
        assert!(err.is_anchor_failure());
    }

    #[test]
    fn ambiguous_anchor_display() {
        let err = InsertError::ambiguous_anchor("PBXBuildFile[App]", "X", 2);
        assert!(err.to_string().contains("matched 2 times"));
        assert!(err.is_anchor_failure());
        assert!(!err.is_collision());
    }

    #[test]
    fn collision_display() {
        let id = ObjectId::new([0xAB; 12]);
        let err = InsertError::identifier_collision(id, "file reference");
        assert_eq!(
            err.to_string(),
            "identifier collision: ABABABABABABABABABABABAB (file reference) already exists"
        );
        assert!(err.is_collision());
    }

    #[test]
    fn id_error_conversion() {
        let id_err = "zz".parse::<ObjectId>().unwrap_err();
        let err: InsertError = id_err.into();
        assert!(matches!(err, InsertError::Identifier(_)));
    }
}
