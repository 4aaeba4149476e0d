//! Locked read-modify-write against real files

use pbx_manifest::prelude::*;
use pbx_store::{
    apply_in_place, lock_path, mutate_in_place, read_all, resolve_manifest_path, write_all,
    ApplyOptions, ManifestLock, StoreError,
};
use pbx_test_utils::{seeded_engine, single_entity_manifest, single_entity_plan, A_REF};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn project(dir: &TempDir, text: &str) -> PathBuf {
    let bundle = dir.path().join("App.xcodeproj");
    fs::create_dir(&bundle).unwrap();
    let path = bundle.join("project.pbxproj");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn added_entity_is_written_back() {
    let dir = TempDir::new().unwrap();
    let path = project(&dir, &single_entity_manifest());

    let mut engine = seeded_engine(11);
    let result = apply_in_place(&path, ApplyOptions::default(), |text| {
        engine.apply(text, &single_entity_plan("B.swift"))
    })
    .unwrap();

    assert!(result.written);
    let InsertOutcome::Added(report) = result.value else {
        panic!("expected Added");
    };
    assert_eq!(read_all(&path).unwrap(), report.text);
}

#[test]
fn already_present_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = project(&dir, &single_entity_manifest());
    let before = fs::read(&path).unwrap();

    let mut engine = seeded_engine(12);
    let result = apply_in_place(&path, ApplyOptions::default(), |text| {
        engine.apply(text, &single_entity_plan("Z.swift"))
    })
    .unwrap();
    assert!(result.written);

    let after_first = fs::read(&path).unwrap();
    assert_ne!(after_first, before);

    let result = apply_in_place(&path, ApplyOptions::default(), |text| {
        engine.apply(text, &single_entity_plan("Z.swift"))
    })
    .unwrap();
    assert!(!result.written);
    assert!(!result.value.is_added());
    assert_eq!(fs::read(&path).unwrap(), after_first);
}

#[test]
fn anchor_failure_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let drifted = single_entity_manifest().replace(&format!("\t\t\t\t{A_REF} /* A.swift */,\n"), "");
    let path = project(&dir, &drifted);

    let err = apply_in_place(&path, ApplyOptions::default(), |text| {
        seeded_engine(13).apply(text, &single_entity_plan("B.swift"))
    })
    .unwrap_err();

    assert!(err.is_insert_failure());
    assert!(matches!(
        err,
        StoreError::Insert(InsertError::AnchorNotFound { ref section, .. }) if section == "PBXGroup"
    ));
    assert_eq!(read_all(&path).unwrap(), drifted);
}

#[test]
fn dry_run_computes_but_does_not_write() {
    let dir = TempDir::new().unwrap();
    let path = project(&dir, &single_entity_manifest());

    let result = apply_in_place(&path, ApplyOptions::dry_run(), |text| {
        seeded_engine(14).apply(text, &single_entity_plan("B.swift"))
    })
    .unwrap();

    assert!(result.value.is_added());
    assert!(!result.written);
    assert_eq!(read_all(&path).unwrap(), single_entity_manifest());
}

#[test]
fn held_lock_makes_second_writer_busy() {
    let dir = TempDir::new().unwrap();
    let path = project(&dir, &single_entity_manifest());

    let held = ManifestLock::acquire(&path).unwrap();
    assert_eq!(held.path(), lock_path(&path).as_path());

    let err = mutate_in_place(&path, ApplyOptions::default(), |_| {
        Ok::<_, StoreError>(((), Some(String::new())))
    })
    .unwrap_err();
    assert!(err.is_lock_busy());
    assert_eq!(read_all(&path).unwrap(), single_entity_manifest());

    drop(held);
    let retry = mutate_in_place(&path, ApplyOptions::default(), |text| {
        Ok::<_, StoreError>(((), Some(text.to_string())))
    })
    .unwrap();
    assert!(!retry.written);
}

#[test]
fn bundle_directory_resolves_to_manifest() {
    let dir = TempDir::new().unwrap();
    let path = project(&dir, "// !$*UTF8*$!\n");
    let bundle = path.parent().unwrap();
    assert_eq!(resolve_manifest_path(bundle).unwrap(), path);

    let empty = dir.path().join("Empty.xcodeproj");
    fs::create_dir(&empty).unwrap();
    assert!(matches!(
        resolve_manifest_path(&empty),
        Err(StoreError::NotAManifest { .. })
    ));
}

#[test]
fn missing_and_binary_files_are_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.pbxproj");
    assert!(matches!(read_all(&missing), Err(StoreError::Io { .. })));

    let binary = dir.path().join("binary.pbxproj");
    fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
    assert!(matches!(read_all(&binary), Err(StoreError::NotUtf8 { .. })));
}

#[test]
fn write_all_replaces_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("project.pbxproj");
    fs::write(&path, "old").unwrap();
    write_all(&path, "new\n").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
}
