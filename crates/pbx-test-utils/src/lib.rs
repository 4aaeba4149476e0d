//! Testing utilities for the pbxpatch workspace
//!
//! Shared manifests, plans and sources.

#![allow(missing_docs)]

use pbx_manifest::{AnchorEntity, Engine, Entity, IdMinter, InsertionPlan, TargetSpec};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Two-target project (app + share extension) written the way Xcode writes it
pub const SNAPZIFY_PROJECT: &str = include_str!("../fixtures/Snapzify.pbxproj");

/// Swift source with malformed `logger."..."` calls
pub const TTS_SOURCE: &str = include_str!("../fixtures/TTSServiceOpenAI.swift");

pub const PINYIN_IMPL_REF: &str = "3D9B1A0F1234567890123456";
pub const PINYIN_IMPL_APP_BUILD: &str = "3D9B1A0E1234567890123456";
pub const PINYIN_IMPL_SHARE_BUILD: &str = "3D4F30C32C6FC87E002CC01C";

pub const A_REF: &str = "AAAAAAAAAAAAAAAAAAAAAA01";
pub const A_BUILD: &str = "AAAAAAAAAAAAAAAAAAAAAA02";

/// One record per section, all for `A.swift`, surrounded by unrelated text
pub fn single_entity_manifest() -> String {
    format!(
        "// !$*UTF8*$!\n\
{{\n\
\tobjects = {{\n\
\n\
/* Begin PBXBuildFile section */\n\
\t\t{A_BUILD} /* A.swift in Sources */ = {{isa = PBXBuildFile; fileRef = {A_REF} /* A.swift */; }};\n\
/* End PBXBuildFile section */\n\
\n\
/* Begin PBXFileReference section */\n\
\t\t{A_REF} /* A.swift */ = {{isa = PBXFileReference; lastKnownFileType = sourcecode.swift; path = A.swift; sourceTree = \"<group>\"; }};\n\
/* End PBXFileReference section */\n\
\n\
/* Begin PBXGroup section */\n\
\t\tCCCCCCCCCCCCCCCCCCCCCC01 /* Sources */ = {{\n\
\t\t\tisa = PBXGroup;\n\
\t\t\tchildren = (\n\
\t\t\t\t{A_REF} /* A.swift */,\n\
\t\t\t);\n\
\t\t\tsourceTree = \"<group>\";\n\
\t\t}};\n\
/* End PBXGroup section */\n\
\n\
/* Begin PBXSourcesBuildPhase section */\n\
\t\tCCCCCCCCCCCCCCCCCCCCCC02 /* Sources */ = {{\n\
\t\t\tisa = PBXSourcesBuildPhase;\n\
\t\t\tfiles = (\n\
\t\t\t\t{A_BUILD} /* A.swift in Sources */,\n\
\t\t\t);\n\
\t\t}};\n\
/* End PBXSourcesBuildPhase section */\n\
\t}};\n\
}}\n"
    )
}

/// Plan adding `name` next to `A.swift` in the single-entity manifest
pub fn single_entity_plan(name: &str) -> InsertionPlan {
    InsertionPlan::new(
        Entity::new(name).unwrap(),
        AnchorEntity::new("A.swift", A_REF.parse().unwrap()).unwrap(),
    )
    .with_target(TargetSpec::new("App", A_BUILD.parse().unwrap()))
}

/// Plan adding `name` next to `PinyinServiceImpl.swift` in both targets
pub fn snapzify_plan(name: &str) -> InsertionPlan {
    InsertionPlan::new(
        Entity::new(name).unwrap(),
        AnchorEntity::new("PinyinServiceImpl.swift", PINYIN_IMPL_REF.parse().unwrap()).unwrap(),
    )
    .with_target(TargetSpec::new(
        "Snapzify",
        PINYIN_IMPL_APP_BUILD.parse().unwrap(),
    ))
    .with_target(TargetSpec::new(
        "ShareExtension",
        PINYIN_IMPL_SHARE_BUILD.parse().unwrap(),
    ))
}

/// Engine whose identifiers are reproducible
pub fn seeded_engine(seed: u64) -> Engine<StdRng> {
    Engine::with_minter(IdMinter::with_rng(StdRng::seed_from_u64(seed)))
}

/// Lines present in `after` but not in `before`, in order
///
/// Multiset difference, good enough for insert-only edits.
pub fn added_lines(before: &str, after: &str) -> Vec<String> {
    let mut remaining: Vec<&str> = before.lines().collect();
    let mut added = Vec::new();
    for line in after.lines() {
        if let Some(pos) = remaining.iter().position(|l| *l == line) {
            remaining.remove(pos);
        } else {
            added.push(line.to_string());
        }
    }
    added
}

/// `after` with every line in `inserted` removed once
pub fn without_lines(after: &str, inserted: &[String]) -> String {
    let mut pending: Vec<&str> = inserted.iter().map(String::as_str).collect();
    let mut out = String::with_capacity(after.len());
    for line in after.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if let Some(pos) = pending.iter().position(|l| *l == bare) {
            pending.remove(pos);
            continue;
        }
        out.push_str(line);
    }
    out
}
