//! Insertion engine
//!
//! Drives one run over an in-memory manifest:
//!
//! ```text
//! Start → presence check ─┬─ present → AlreadyPresent (no mutation)
//!                         └─ absent  → mint ids → BuildFile×targets
//!                                    → FileReference → Group
//!                                    → SourcesBuildPhase×targets → Added
//! ```
//!
//! Every step takes the buffer by reference and hands back a new one, so a
//! failure at any step leaves the caller's text exactly as it was.

use crate::entity::{AnchorEntity, Entity, TargetSpec};
use crate::error::InsertError;
use crate::id::{IdMinter, MintedIds, ObjectId};
use crate::insert::splice;
use crate::presence::is_present;
use crate::section::{Insertion, SectionKind};
use rand::rngs::ThreadRng;
use rand::RngCore;
use std::collections::HashSet;

/// Everything needed to register one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPlan {
    entity: Entity,
    anchor: AnchorEntity,
    file_ref: Option<ObjectId>,
    targets: Vec<TargetSpec>,
}

impl InsertionPlan {
    /// Create plan without targets
    #[inline]
    #[must_use]
    pub fn new(entity: Entity, anchor: AnchorEntity) -> Self {
        Self {
            entity,
            anchor,
            file_ref: None,
            targets: Vec::new(),
        }
    }

    /// Add a build target
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.targets.push(target);
        self
    }

    /// Pin the file-reference identifier instead of minting one
    #[inline]
    #[must_use]
    pub fn with_file_ref(mut self, id: ObjectId) -> Self {
        self.file_ref = Some(id);
        self
    }

    /// Entity being registered
    #[inline]
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Anchor entity
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> &AnchorEntity {
        &self.anchor
    }

    /// Build targets, in application order
    #[inline]
    #[must_use]
    pub fn targets(&self) -> &[TargetSpec] {
        &self.targets
    }

    /// Check plan consistency
    ///
    /// # Errors
    /// Returns `InvalidPlan` if there are no targets, a target name repeats,
    /// an anchor build-file id repeats, or the entity is its own anchor
    pub fn validate(&self) -> Result<(), InsertError> {
        if self.targets.is_empty() {
            return Err(InsertError::InvalidPlan(
                "at least one build target is required".to_string(),
            ));
        }
        if self.entity.display_name() == self.anchor.display_name() {
            return Err(InsertError::InvalidPlan(format!(
                "'{}' cannot anchor itself",
                self.entity.display_name()
            )));
        }
        let mut names = HashSet::new();
        let mut anchors = HashSet::new();
        for target in &self.targets {
            if !names.insert(target.name()) {
                return Err(InsertError::InvalidPlan(format!(
                    "duplicate target '{}'",
                    target.name()
                )));
            }
            if !anchors.insert(target.anchor_build_file()) {
                return Err(InsertError::InvalidPlan(format!(
                    "anchor build file {} listed for more than one target",
                    target.anchor_build_file()
                )));
            }
        }
        Ok(())
    }

    /// Insertions for a set of minted identifiers, in application order
    ///
    /// # Errors
    /// Returns error if an anchor pattern fails to compile, or if `ids`
    /// lacks a target of this plan
    pub fn insertions(&self, ids: &MintedIds) -> Result<Vec<Insertion>, InsertError> {
        let build_id = |target: &TargetSpec| {
            ids.build_file(target.name()).ok_or_else(|| {
                InsertError::InvalidPlan(format!("no identifier minted for target '{}'", target.name()))
            })
        };

        let mut out = Vec::with_capacity(2 + 2 * self.targets.len());
        for target in &self.targets {
            out.push(Insertion::build_file(
                target.name(),
                &self.anchor,
                target.anchor_build_file(),
                &self.entity,
                build_id(target)?,
                ids.file_ref,
            )?);
        }
        out.push(Insertion::file_reference(&self.anchor, &self.entity, ids.file_ref)?);
        out.push(Insertion::group_child(&self.anchor, &self.entity, ids.file_ref)?);
        for target in &self.targets {
            out.push(Insertion::phase_member(
                target.name(),
                &self.anchor,
                target.anchor_build_file(),
                &self.entity,
                build_id(target)?,
            )?);
        }
        Ok(out)
    }
}

/// One applied insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedInsertion {
    /// Section written
    pub section: SectionKind,
    /// Target, for per-target sections
    pub target: Option<String>,
    /// The inserted line, indentation and terminator included
    pub line: String,
}

/// Successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertReport {
    /// The fully mutated manifest
    pub text: String,
    /// Identifiers minted for the entity
    pub ids: MintedIds,
    /// Insertions, in application order
    pub applied: Vec<AppliedInsertion>,
}

/// Terminal outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Entity registered; the report carries the new text
    Added(InsertReport),
    /// Entity already in the manifest; nothing was changed
    AlreadyPresent {
        /// Name that was found
        display_name: String,
    },
}

impl InsertOutcome {
    /// Whether the manifest text changed
    #[inline]
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    /// New manifest text, if any
    #[inline]
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Added(report) => Some(&report.text),
            Self::AlreadyPresent { .. } => None,
        }
    }
}

/// Stateless-per-run insertion engine
///
/// Holds only the identifier minter; the manifest text is passed in and
/// returned by value on every run.
#[derive(Debug, Clone)]
pub struct Engine<R = ThreadRng> {
    minter: IdMinter<R>,
}

impl Engine<ThreadRng> {
    /// Engine minting from the thread-local generator
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            minter: IdMinter::new(),
        }
    }
}

impl Default for Engine<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> Engine<R> {
    /// Engine with an explicit minter
    #[inline]
    #[must_use]
    pub fn with_minter(minter: IdMinter<R>) -> Self {
        Self { minter }
    }

    /// Register `plan`'s entity in `text`
    ///
    /// # Errors
    /// - `InvalidPlan` / `InvalidEntity` for inconsistent plans
    /// - `IdentifierCollision` if identifiers cannot be made unique
    /// - `AnchorNotFound` / `AmbiguousAnchor` for the first section whose
    ///   anchor does not resolve; later sections are not attempted
    pub fn apply(&mut self, text: &str, plan: &InsertionPlan) -> Result<InsertOutcome, InsertError> {
        plan.validate()?;

        let name = plan.entity().display_name();
        if is_present(text, name) {
            tracing::info!(entity = name, "already present, nothing to do");
            return Ok(InsertOutcome::AlreadyPresent {
                display_name: name.to_string(),
            });
        }

        let ids = self.minter.mint(text, plan.file_ref, plan.targets())?;
        tracing::debug!(
            entity = name,
            file_ref = %ids.file_ref,
            targets = ids.build_files.len(),
            "minted identifiers"
        );

        let mut buffer = text.to_string();
        let mut applied = Vec::new();
        for insertion in plan.insertions(&ids)? {
            let spliced = splice(&buffer, &insertion)?;
            tracing::debug!(
                section = %insertion.label(),
                offset = spliced.offset,
                "inserted record"
            );
            applied.push(AppliedInsertion {
                section: insertion.section(),
                target: insertion.target().map(str::to_string),
                line: spliced.text[spliced.offset..spliced.offset + spliced.len].to_string(),
            });
            buffer = spliced.text;
        }

        tracing::info!(entity = name, insertions = applied.len(), "entity registered");
        Ok(InsertOutcome::Added(InsertReport {
            text: buffer,
            ids,
            applied,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const A_REF: &str = "AAAAAAAAAAAAAAAAAAAAAA01";
    const A_BUILD: &str = "AAAAAAAAAAAAAAAAAAAAAA02";

    fn manifest() -> String {
        format!(
            "/* Begin PBXBuildFile section */\n\
             \t\t{A_BUILD} /* A.swift in Sources */ = {{isa = PBXBuildFile; fileRef = {A_REF} /* A.swift */; }};\n\
             /* End PBXBuildFile section */\n\
             /* Begin PBXFileReference section */\n\
             \t\t{A_REF} /* A.swift */ = {{isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = A.swift; sourceTree = \"<group>\"; }};\n\
             /* End PBXFileReference section */\n\
             \t\t\tchildren = (\n\
             \t\t\t\t{A_REF} /* A.swift */,\n\
             \t\t\t);\n\
             \t\t\tfiles = (\n\
             \t\t\t\t{A_BUILD} /* A.swift in Sources */,\n\
             \t\t\t);\n"
        )
    }

    fn plan() -> InsertionPlan {
        InsertionPlan::new(
            Entity::new("B.swift").unwrap(),
            AnchorEntity::new("A.swift", A_REF.parse().unwrap()).unwrap(),
        )
        .with_target(TargetSpec::new("App", A_BUILD.parse().unwrap()))
    }

    fn engine() -> Engine<StdRng> {
        Engine::with_minter(IdMinter::with_rng(StdRng::seed_from_u64(42)))
    }

    #[test]
    fn adds_four_records() {
        let outcome = engine().apply(&manifest(), &plan()).unwrap();
        let InsertOutcome::Added(report) = outcome else {
            panic!("expected Added");
        };
        assert_eq!(report.applied.len(), 4);
        let sections: Vec<_> = report.applied.iter().map(|a| a.section).collect();
        assert_eq!(sections, SectionKind::ALL.to_vec());
        assert_eq!(report.text.matches("B.swift").count(), 6);
    }

    #[test]
    fn second_run_is_noop() {
        let mut engine = engine();
        let first = engine.apply(&manifest(), &plan()).unwrap();
        let text = first.text().unwrap().to_string();
        let second = engine.apply(&text, &plan()).unwrap();
        assert_eq!(
            second,
            InsertOutcome::AlreadyPresent {
                display_name: "B.swift".to_string()
            }
        );
        assert!(second.text().is_none());
    }

    #[test]
    fn missing_anchor_aborts() {
        let text = manifest().replace(&format!("{A_REF} /* A.swift */,\n"), "");
        let err = engine().apply(&text, &plan()).unwrap_err();
        match err {
            InsertError::AnchorNotFound { section, .. } => assert_eq!(section, "PBXGroup"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn plan_without_targets_is_invalid() {
        let plan = InsertionPlan::new(
            Entity::new("B.swift").unwrap(),
            AnchorEntity::new("A.swift", A_REF.parse().unwrap()).unwrap(),
        );
        assert!(matches!(
            engine().apply(&manifest(), &plan),
            Err(InsertError::InvalidPlan(_))
        ));
    }

    #[test]
    fn plan_rejects_duplicate_targets() {
        let plan = plan().with_target(TargetSpec::new("App", "AAAAAAAAAAAAAAAAAAAAAA03".parse().unwrap()));
        assert!(matches!(plan.validate(), Err(InsertError::InvalidPlan(_))));
    }

    #[test]
    fn plan_rejects_self_anchor() {
        let plan = InsertionPlan::new(
            Entity::new("A.swift").unwrap(),
            AnchorEntity::new("A.swift", A_REF.parse().unwrap()).unwrap(),
        )
        .with_target(TargetSpec::new("App", A_BUILD.parse().unwrap()));
        assert!(matches!(plan.validate(), Err(InsertError::InvalidPlan(_))));
    }

    #[test]
    fn pinned_file_ref_is_used() {
        let pinned: ObjectId = "3D9B1A301234567890123460".parse().unwrap();
        let outcome = engine()
            .apply(&manifest(), &plan().with_file_ref(pinned))
            .unwrap();
        let InsertOutcome::Added(report) = outcome else {
            panic!("expected Added");
        };
        assert_eq!(report.ids.file_ref, pinned);
        assert!(report.text.contains("3D9B1A301234567890123460 /* B.swift */,\n"));
    }
}
