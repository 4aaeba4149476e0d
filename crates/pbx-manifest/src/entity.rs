//! Entities being registered and the anchors that locate them
//!
//! An [`Entity`] is the new file; an [`AnchorEntity`] is an existing,
//! known-present neighbour whose records mark where each of the entity's
//! records goes. [`TargetSpec`] ties the two together per build target.

use crate::error::InsertError;
use crate::id::ObjectId;
use std::borrow::Cow;
use std::path::Path;

/// Default `lastKnownFileType`
pub const DEFAULT_FILE_TYPE: &str = "sourcecode.swift";

/// Default `sourceTree`
pub const DEFAULT_SOURCE_TREE: &str = "<group>";

/// A logical file being added to the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    display_name: String,
    file_type: String,
    path: String,
    source_tree: String,
}

impl Entity {
    /// Create entity, inferring file type from the extension
    ///
    /// # Errors
    /// Returns `InvalidEntity` if the name cannot be embedded in a record
    pub fn new(display_name: impl Into<String>) -> Result<Self, InsertError> {
        let display_name = display_name.into();
        validate_display_name(&display_name)?;
        Ok(Self {
            file_type: file_type_for(&display_name).to_string(),
            path: display_name.clone(),
            source_tree: DEFAULT_SOURCE_TREE.to_string(),
            display_name,
        })
    }

    /// With explicit `lastKnownFileType`
    #[inline]
    #[must_use]
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = file_type.into();
        self
    }

    /// With explicit `path` (defaults to the display name)
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// With explicit `sourceTree`
    #[inline]
    #[must_use]
    pub fn with_source_tree(mut self, source_tree: impl Into<String>) -> Self {
        self.source_tree = source_tree.into();
        self
    }

    /// Display name, also the presence key
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// `lastKnownFileType`
    #[inline]
    #[must_use]
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    /// `path`
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `sourceTree`
    #[inline]
    #[must_use]
    pub fn source_tree(&self) -> &str {
        &self.source_tree
    }
}

/// Existing neighbour whose records are the insertion anchors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorEntity {
    display_name: String,
    file_ref: ObjectId,
}

impl AnchorEntity {
    /// Create anchor
    ///
    /// # Errors
    /// Returns `InvalidEntity` if the name cannot appear in a record
    pub fn new(display_name: impl Into<String>, file_ref: ObjectId) -> Result<Self, InsertError> {
        let display_name = display_name.into();
        validate_display_name(&display_name)?;
        Ok(Self {
            display_name,
            file_ref,
        })
    }

    /// Anchor display name
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Anchor's `PBXFileReference` identifier
    #[inline]
    #[must_use]
    pub fn file_ref(&self) -> ObjectId {
        self.file_ref
    }
}

/// One build target the entity joins
///
/// `anchor_build_file` is the anchor's `PBXBuildFile` id in that target;
/// `build_file` optionally pins the id the new record gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    name: String,
    anchor_build_file: ObjectId,
    build_file: Option<ObjectId>,
}

impl TargetSpec {
    /// Create target
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, anchor_build_file: ObjectId) -> Self {
        Self {
            name: name.into(),
            anchor_build_file,
            build_file: None,
        }
    }

    /// Pin the build-file identifier instead of minting one
    #[inline]
    #[must_use]
    pub fn with_build_file(mut self, id: ObjectId) -> Self {
        self.build_file = Some(id);
        self
    }

    /// Target name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Anchor's build-file identifier in this target
    #[inline]
    #[must_use]
    pub fn anchor_build_file(&self) -> ObjectId {
        self.anchor_build_file
    }

    /// Pinned build-file identifier
    #[inline]
    #[must_use]
    pub fn build_file(&self) -> Option<ObjectId> {
        self.build_file
    }
}

/// `lastKnownFileType` for a file name, by extension
#[must_use]
pub fn file_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    match ext {
        "m" => "sourcecode.c.objc",
        "mm" => "sourcecode.cpp.objcpp",
        "h" => "sourcecode.c.h",
        "c" => "sourcecode.c.c",
        "cpp" | "cc" => "sourcecode.cpp.cpp",
        "metal" => "sourcecode.metal",
        _ => DEFAULT_FILE_TYPE,
    }
}

/// Quote a value the way the manifest's plist dialect requires
///
/// Bare words are limited to `[A-Za-z0-9_$./-]`; anything else is wrapped
/// in double quotes with `"` and `\` escaped.
#[must_use]
pub fn quote_value(value: &str) -> Cow<'_, str> {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.' | '/' | '-'));
    if bare {
        return Cow::Borrowed(value);
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

fn validate_display_name(name: &str) -> Result<(), InsertError> {
    if name.trim().is_empty() {
        return Err(InsertError::InvalidEntity("display name is empty".to_string()));
    }
    if name.contains("*/") || name.contains("/*") {
        return Err(InsertError::InvalidEntity(format!(
            "display name '{name}' contains a comment delimiter"
        )));
    }
    if name.contains(['\n', '\r']) {
        return Err(InsertError::InvalidEntity(format!(
            "display name '{}' spans lines",
            name.escape_debug()
        )));
    }
    Ok(())
}
