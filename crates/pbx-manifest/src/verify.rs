//! Post-insertion reference audit
//!
//! Counts where each minted identifier occurs and compares against the
//! expected cross-references: the file reference is declared once, listed
//! once as a group child and referenced once per build record; every build
//! record id is declared once and listed once in its build phase.

use crate::error::InsertError;
use crate::id::{MintedIds, ObjectId};
use crate::section::SOURCES_PHASE;
use std::fmt::{self, Display, Formatter};

/// One mismatch between expected and observed occurrences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceProblem {
    /// Identifier concerned
    pub id: ObjectId,
    /// What was counted
    pub what: String,
    /// Expected count
    pub expected: usize,
    /// Observed count
    pub found: usize,
}

impl Display for ReferenceProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: expected {}, found {}",
            self.id, self.what, self.expected, self.found
        )
    }
}

/// Audit result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceAudit {
    /// Mismatches, empty when consistent
    pub problems: Vec<ReferenceProblem>,
}

impl Display for ReferenceAudit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.problems.is_empty() {
            return f.write_str("consistent");
        }
        for (i, problem) in self.problems.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{problem}")?;
        }
        Ok(())
    }
}

impl ReferenceAudit {
    /// Turn an inconsistent audit into an error
    ///
    /// # Errors
    /// Returns `Unverified` carrying the audit when it has problems
    pub fn into_result(self) -> Result<(), InsertError> {
        if self.is_consistent() {
            Ok(())
        } else {
            Err(InsertError::Unverified(self))
        }
    }

    /// No mismatches
    #[inline]
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.problems.is_empty()
    }

    fn expect(&mut self, id: ObjectId, what: impl Into<String>, expected: usize, found: usize) {
        if expected != found {
            self.problems.push(ReferenceProblem {
                id,
                what: what.into(),
                expected,
                found,
            });
        }
    }
}

/// Audit `text` for the identifiers minted for `display_name`
#[must_use]
pub fn verify_references(text: &str, display_name: &str, ids: &MintedIds) -> ReferenceAudit {
    let mut audit = ReferenceAudit::default();
    let targets = ids.build_files.len();

    let file_ref = format!("{} /* {display_name} */", ids.file_ref);
    audit.expect(
        ids.file_ref,
        "PBXFileReference declarations",
        1,
        text.matches(&format!("{file_ref} = {{isa = PBXFileReference;")).count(),
    );
    audit.expect(
        ids.file_ref,
        "group children",
        1,
        text.matches(&format!("{file_ref},")).count(),
    );
    audit.expect(
        ids.file_ref,
        "fileRef uses",
        targets,
        text.matches(&format!("fileRef = {file_ref};")).count(),
    );
    audit.expect(
        ids.file_ref,
        "occurrences",
        2 + targets,
        text.matches(&ids.file_ref.to_string()).count(),
    );

    for target in &ids.build_files {
        let id = target.build_file;
        let build = format!("{id} /* {display_name} in {SOURCES_PHASE} */");
        audit.expect(
            id,
            format!("PBXBuildFile declarations ({})", target.target),
            1,
            text.matches(&format!("{build} = {{isa = PBXBuildFile;")).count(),
        );
        audit.expect(
            id,
            format!("build phase entries ({})", target.target),
            1,
            text.matches(&format!("{build},")).count(),
        );
        audit.expect(
            id,
            format!("occurrences ({})", target.target),
            2,
            text.matches(&id.to_string()).count(),
        );
    }

    audit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::TargetId;

    fn ids() -> MintedIds {
        MintedIds {
            file_ref: "BBBBBBBBBBBBBBBBBBBBBB01".parse().unwrap(),
            build_files: vec![TargetId {
                target: "App".to_string(),
                build_file: "BBBBBBBBBBBBBBBBBBBBBB02".parse().unwrap(),
            }],
        }
    }

    const CONSISTENT: &str = "\
\t\tBBBBBBBBBBBBBBBBBBBBBB02 /* B.swift in Sources */ = {isa = PBXBuildFile; fileRef = BBBBBBBBBBBBBBBBBBBBBB01 /* B.swift */; };
\t\tBBBBBBBBBBBBBBBBBBBBBB01 /* B.swift */ = {isa = PBXFileReference; path = B.swift; };
\t\t\t\tBBBBBBBBBBBBBBBBBBBBBB01 /* B.swift */,
\t\t\t\tBBBBBBBBBBBBBBBBBBBBBB02 /* B.swift in Sources */,
";

    #[test]
    fn consistent_manifest_passes() {
        let audit = verify_references(CONSISTENT, "B.swift", &ids());
        assert!(audit.is_consistent(), "{:?}", audit.problems);
    }

    #[test]
    fn missing_phase_entry_is_reported() {
        let text = CONSISTENT.replace("\t\t\t\tBBBBBBBBBBBBBBBBBBBBBB02 /* B.swift in Sources */,\n", "");
        let audit = verify_references(&text, "B.swift", &ids());
        assert!(!audit.is_consistent());
        assert!(audit
            .problems
            .iter()
            .any(|p| p.what.starts_with("build phase entries") && p.found == 0));
    }

    #[test]
    fn orphan_reference_is_reported() {
        let text = format!("{CONSISTENT}\t\t\t\tBBBBBBBBBBBBBBBBBBBBBB01 /* B.swift */,\n");
        let audit = verify_references(&text, "B.swift", &ids());
        assert_eq!(audit.problems.len(), 2);
        assert_eq!(
            audit.problems[0].to_string(),
            "BBBBBBBBBBBBBBBBBBBBBB01 group children: expected 1, found 2"
        );
        assert!(matches!(audit.into_result(), Err(InsertError::Unverified(_))));
    }
}
