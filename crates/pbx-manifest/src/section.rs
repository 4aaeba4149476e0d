//! Manifest sections and the per-section anchor/record pairs
//!
//! Each of the four coordinated sections gets an [`Insertion`]: the
//! [`AnchorPattern`] that locates the anchor entity's record, and the
//! rendered record for the new entity. Records are rendered without
//! indentation or line terminator; the inserter copies both from the anchor.

use crate::entity::{quote_value, AnchorEntity, Entity};
use crate::error::InsertError;
use crate::id::ObjectId;
use regex::Regex;
use std::fmt::{self, Display, Formatter};
use std::ops::Range;

/// Build phase label used in build-file comments
pub const SOURCES_PHASE: &str = "Sources";

/// The coordinated manifest sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    /// `PBXBuildFile`: build registration, one record per target
    BuildFile,
    /// `PBXFileReference`: identity declaration
    FileReference,
    /// `PBXGroup` children: group membership
    Group,
    /// `PBXSourcesBuildPhase` files: build-step membership, one per target
    SourcesBuildPhase,
}

impl SectionKind {
    /// All sections, in application order
    pub const ALL: [SectionKind; 4] = [
        SectionKind::BuildFile,
        SectionKind::FileReference,
        SectionKind::Group,
        SectionKind::SourcesBuildPhase,
    ];

    /// Section name as it appears in the manifest's section markers
    #[inline]
    #[must_use]
    pub fn isa(&self) -> &'static str {
        match self {
            SectionKind::BuildFile => "PBXBuildFile",
            SectionKind::FileReference => "PBXFileReference",
            SectionKind::Group => "PBXGroup",
            SectionKind::SourcesBuildPhase => "PBXSourcesBuildPhase",
        }
    }

    /// Whether the section holds one record per build target
    #[inline]
    #[must_use]
    pub fn is_per_target(&self) -> bool {
        matches!(self, SectionKind::BuildFile | SectionKind::SourcesBuildPhase)
    }
}

impl Display for SectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.isa())
    }
}

/// Pattern matching one existing record, trailing line terminator included
///
/// Membership records (group children, phase files) are matched literally.
/// Definition records are matched on their head, `ID /* name */ = {`, and
/// then any body free of `}` up to the closing `};`.
#[derive(Debug, Clone)]
pub struct AnchorPattern {
    text: String,
    regex: Regex,
}

impl AnchorPattern {
    /// Match `text` followed by a line terminator
    ///
    /// # Errors
    /// Returns error if the pattern fails to compile
    pub fn literal(text: impl Into<String>) -> Result<Self, InsertError> {
        let text = text.into();
        let regex = Regex::new(&format!(r"{}\r?\n", regex::escape(&text)))?;
        Ok(Self { text, regex })
    }

    /// Match a `head = {...};` definition followed by a line terminator
    ///
    /// # Errors
    /// Returns error if the pattern fails to compile
    pub fn definition(head: impl Into<String>) -> Result<Self, InsertError> {
        let head = head.into();
        let regex = Regex::new(&format!(r"{} = \{{[^}}]+\}};\r?\n", regex::escape(&head)))?;
        Ok(Self {
            text: format!("{head} = {{...}};"),
            regex,
        })
    }

    /// Human-readable form used in error messages
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte ranges of every non-overlapping match
    #[must_use]
    pub fn find_all(&self, buffer: &str) -> Vec<Range<usize>> {
        self.regex.find_iter(buffer).map(|m| m.range()).collect()
    }
}

impl Display for AnchorPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One record to insert after one anchor
#[derive(Debug, Clone)]
pub struct Insertion {
    section: SectionKind,
    target: Option<String>,
    anchor: AnchorPattern,
    record: String,
}

impl Insertion {
    /// Create insertion
    #[inline]
    #[must_use]
    pub fn new(
        section: SectionKind,
        target: Option<String>,
        anchor: AnchorPattern,
        record: impl Into<String>,
    ) -> Self {
        Self {
            section,
            target,
            anchor,
            record: record.into(),
        }
    }

    /// `PBXBuildFile` record for one target
    ///
    /// # Errors
    /// Returns error if the anchor pattern fails to compile
    pub fn build_file(
        target: &str,
        anchor: &AnchorEntity,
        anchor_build: ObjectId,
        entity: &Entity,
        build: ObjectId,
        file_ref: ObjectId,
    ) -> Result<Self, InsertError> {
        let head = build_file_comment(anchor_build, anchor.display_name());
        let record = format!(
            "{} = {{isa = PBXBuildFile; fileRef = {} /* {} */; }};",
            build_file_comment(build, entity.display_name()),
            file_ref,
            entity.display_name(),
        );
        Ok(Self::new(
            SectionKind::BuildFile,
            Some(target.to_string()),
            AnchorPattern::definition(head)?,
            record,
        ))
    }

    /// `PBXFileReference` record
    ///
    /// # Errors
    /// Returns error if the anchor pattern fails to compile
    pub fn file_reference(
        anchor: &AnchorEntity,
        entity: &Entity,
        file_ref: ObjectId,
    ) -> Result<Self, InsertError> {
        let head = file_ref_comment(anchor.file_ref(), anchor.display_name());
        let record = format!(
            "{} = {{isa = PBXFileReference; lastKnownFileType = {}; path = {}; sourceTree = {}; }};",
            file_ref_comment(file_ref, entity.display_name()),
            quote_value(entity.file_type()),
            quote_value(entity.path()),
            quote_value(entity.source_tree()),
        );
        Ok(Self::new(
            SectionKind::FileReference,
            None,
            AnchorPattern::definition(head)?,
            record,
        ))
    }

    /// `PBXGroup` child entry
    ///
    /// # Errors
    /// Returns error if the anchor pattern fails to compile
    pub fn group_child(
        anchor: &AnchorEntity,
        entity: &Entity,
        file_ref: ObjectId,
    ) -> Result<Self, InsertError> {
        let anchor_text = format!(
            "{},",
            file_ref_comment(anchor.file_ref(), anchor.display_name())
        );
        let record = format!("{},", file_ref_comment(file_ref, entity.display_name()));
        Ok(Self::new(
            SectionKind::Group,
            None,
            AnchorPattern::literal(anchor_text)?,
            record,
        ))
    }

    /// `PBXSourcesBuildPhase` file entry for one target
    ///
    /// # Errors
    /// Returns error if the anchor pattern fails to compile
    pub fn phase_member(
        target: &str,
        anchor: &AnchorEntity,
        anchor_build: ObjectId,
        entity: &Entity,
        build: ObjectId,
    ) -> Result<Self, InsertError> {
        let anchor_text = format!(
            "{},",
            build_file_comment(anchor_build, anchor.display_name())
        );
        let record = format!("{},", build_file_comment(build, entity.display_name()));
        Ok(Self::new(
            SectionKind::SourcesBuildPhase,
            Some(target.to_string()),
            AnchorPattern::literal(anchor_text)?,
            record,
        ))
    }

    /// Section
    #[inline]
    #[must_use]
    pub fn section(&self) -> SectionKind {
        self.section
    }

    /// Build target, for per-target sections
    #[inline]
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Anchor pattern
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> &AnchorPattern {
        &self.anchor
    }

    /// Record text, without indentation or terminator
    #[inline]
    #[must_use]
    pub fn record(&self) -> &str {
        &self.record
    }

    /// Section label for messages, e.g. `PBXBuildFile[ShareExtension]`
    #[must_use]
    pub fn label(&self) -> String {
        match &self.target {
            Some(target) => format!("{}[{}]", self.section, target),
            None => self.section.to_string(),
        }
    }
}

fn file_ref_comment(id: ObjectId, name: &str) -> String {
    format!("{id} /* {name} */")
}

fn build_file_comment(id: ObjectId, name: &str) -> String {
    format!("{id} /* {name} in {SOURCES_PHASE} */")
}
