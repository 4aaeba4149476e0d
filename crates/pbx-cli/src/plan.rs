//! Insertion plan files
//!
//! ```toml
//! [entity]
//! name = "ChineseProcessingService.swift"
//!
//! [anchor]
//! name = "PinyinServiceOpenAI.swift"
//! file_ref = "3D9B1A201234567890123457"
//!
//! [[target]]
//! name = "Snapzify"
//! anchor_build_file = "3D9B1A211234567890123458"
//! ```

use anyhow::{bail, Context, Result};
use pbx_manifest::{AnchorEntity, Entity, InsertionPlan, ObjectId, TargetSpec};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level plan file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlanFile {
    pub(crate) entity: EntitySection,
    pub(crate) anchor: AnchorSection,
    #[serde(default, rename = "target")]
    pub(crate) targets: Vec<TargetSection>,
}

/// `[entity]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EntitySection {
    pub(crate) name: String,
    pub(crate) file_type: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) source_tree: Option<String>,
    /// Pinned file-reference id
    pub(crate) file_ref: Option<String>,
}

/// `[anchor]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct AnchorSection {
    pub(crate) name: String,
    pub(crate) file_ref: String,
}

/// `[[target]]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TargetSection {
    pub(crate) name: String,
    pub(crate) anchor_build_file: String,
    /// Pinned build-record id
    pub(crate) build_file: Option<String>,
}

impl PlanFile {
    /// Read and parse a plan file
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid plan {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Convert into the core's plan, validating every identifier
    pub(crate) fn into_plan(self) -> Result<InsertionPlan> {
        let mut entity = Entity::new(self.entity.name)?;
        if let Some(file_type) = self.entity.file_type {
            entity = entity.with_file_type(file_type);
        }
        if let Some(path) = self.entity.path {
            entity = entity.with_path(path);
        }
        if let Some(tree) = self.entity.source_tree {
            entity = entity.with_source_tree(tree);
        }

        let anchor = AnchorEntity::new(
            self.anchor.name,
            parse_id(&self.anchor.file_ref, "anchor.file_ref")?,
        )?;

        if self.targets.is_empty() {
            bail!("plan has no [[target]] entries");
        }

        let mut plan = InsertionPlan::new(entity, anchor);
        if let Some(id) = self.entity.file_ref {
            plan = plan.with_file_ref(parse_id(&id, "entity.file_ref")?);
        }
        for target in self.targets {
            let field = format!("target '{}' anchor_build_file", target.name);
            let mut spec = TargetSpec::new(
                target.name.clone(),
                parse_id(&target.anchor_build_file, &field)?,
            );
            if let Some(id) = target.build_file {
                spec = spec.with_build_file(parse_id(&id, &format!("target '{}' build_file", target.name))?);
            }
            plan = plan.with_target(spec);
        }
        plan.validate()?;
        Ok(plan)
    }
}

/// Plan assembled from command-line flags
#[derive(Debug, Clone, Default)]
pub(crate) struct FlagPlan {
    pub(crate) name: String,
    pub(crate) anchor: String,
    pub(crate) anchor_file_ref: String,
    pub(crate) target: String,
    pub(crate) anchor_build_file: String,
    pub(crate) aux_target: Option<String>,
    pub(crate) aux_anchor_build_file: Option<String>,
    pub(crate) file_type: Option<String>,
}

impl FlagPlan {
    pub(crate) fn into_plan(self) -> Result<InsertionPlan> {
        let mut targets = vec![TargetSection {
            name: self.target,
            anchor_build_file: self.anchor_build_file,
            build_file: None,
        }];
        match (self.aux_target, self.aux_anchor_build_file) {
            (Some(name), Some(anchor_build_file)) => targets.push(TargetSection {
                name,
                anchor_build_file,
                build_file: None,
            }),
            (None, None) => {}
            _ => bail!("--aux-target and --aux-anchor-build-file must be given together"),
        }

        PlanFile {
            entity: EntitySection {
                name: self.name,
                file_type: self.file_type,
                path: None,
                source_tree: None,
                file_ref: None,
            },
            anchor: AnchorSection {
                name: self.anchor,
                file_ref: self.anchor_file_ref,
            },
            targets,
        }
        .into_plan()
    }
}

fn parse_id(text: &str, field: &str) -> Result<ObjectId> {
    text.parse::<ObjectId>()
        .with_context(|| format!("{field}: '{text}' is not a 24-digit hex identifier"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
[entity]
name = "ChineseProcessingService.swift"

[anchor]
name = "PinyinServiceOpenAI.swift"
file_ref = "3D9B1A201234567890123457"

[[target]]
name = "Snapzify"
anchor_build_file = "3D9B1A211234567890123458"

[[target]]
name = "ShareExtension"
anchor_build_file = "3D4F30C32C6FC87E002CC01C"
build_file = "3d4f30c32c6fc87e002cc0ff"
"#;

    #[test]
    fn parses_two_target_plan() {
        let plan = PlanFile::parse(PLAN).unwrap().into_plan().unwrap();
        assert_eq!(plan.entity().display_name(), "ChineseProcessingService.swift");
        assert_eq!(plan.anchor().display_name(), "PinyinServiceOpenAI.swift");
        let names: Vec<&str> = plan.targets().iter().map(TargetSpec::name).collect();
        assert_eq!(names, ["Snapzify", "ShareExtension"]);
        assert_eq!(
            plan.targets()[1].build_file().map(|id| id.to_string()),
            Some("3D4F30C32C6FC87E002CC0FF".to_string())
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let text = PLAN.replace("[anchor]", "[anchor]\ncolour = \"red\"");
        assert!(PlanFile::parse(&text).is_err());
    }

    #[test]
    fn rejects_bad_identifier() {
        let text = PLAN.replace("3D9B1A201234567890123457", "not-an-id");
        let err = PlanFile::parse(&text).unwrap().into_plan().unwrap_err();
        assert!(err.to_string().contains("anchor.file_ref"));
    }

    #[test]
    fn requires_targets() {
        let text = PLAN.split("[[target]]").next().unwrap().to_string();
        assert!(PlanFile::parse(&text).unwrap().into_plan().is_err());
    }

    #[test]
    fn flags_need_both_aux_values() {
        let flags = FlagPlan {
            name: "B.swift".into(),
            anchor: "A.swift".into(),
            anchor_file_ref: "AAAAAAAAAAAAAAAAAAAAAA01".into(),
            target: "App".into(),
            anchor_build_file: "AAAAAAAAAAAAAAAAAAAAAA02".into(),
            aux_target: Some("Share".into()),
            ..FlagPlan::default()
        };
        assert!(flags.into_plan().is_err());
    }
}
