//! `pbxpatch add-file`

use crate::plan::{FlagPlan, PlanFile};
use anyhow::{Context, Result};
use pbx_manifest::{verify_references, Engine, InsertOutcome, InsertionPlan};
use pbx_store::{apply_in_place, resolve_manifest_path, ApplyOptions};
use std::path::PathBuf;

/// Where the insertion plan comes from
#[derive(Debug, Clone)]
pub(crate) enum PlanSource {
    /// TOML plan file
    File(PathBuf),
    /// Individual flags
    Flags(FlagPlan),
}

/// Parsed `add-file` arguments
#[derive(Debug, Clone)]
pub(crate) struct AddFileArgs {
    pub(crate) project: PathBuf,
    pub(crate) plan: PlanSource,
    pub(crate) dry_run: bool,
    pub(crate) verify: bool,
}

pub(crate) fn run(args: AddFileArgs) -> Result<()> {
    let manifest = resolve_manifest_path(&args.project)?;
    let plan = match args.plan {
        PlanSource::File(path) => PlanFile::load(&path)?.into_plan(),
        PlanSource::Flags(flags) => flags.into_plan(),
    }
    .context("invalid insertion plan")?;

    tracing::debug!(
        manifest = %manifest.display(),
        entity = plan.entity().display_name(),
        anchor = plan.anchor().display_name(),
        targets = plan.targets().len(),
        "add-file"
    );

    let options = ApplyOptions {
        dry_run: args.dry_run,
    };
    let mut engine = Engine::new();
    let result = apply_in_place(&manifest, options, |text| {
        let outcome = engine.apply(text, &plan)?;
        if args.verify {
            verify(&outcome, &plan)?;
        }
        Ok(outcome)
    })?;

    let name = plan.entity().display_name();
    match result.value {
        InsertOutcome::Added(report) => {
            if args.dry_run {
                for applied in &report.applied {
                    println!("+ {}", applied.line.trim_end());
                }
                println!("Would add {name} to project (dry run)");
            } else {
                println!("Added {name} to project");
            }
            for id in &report.ids.build_files {
                tracing::info!(build_target = %id.target, build_file = %id.build_file, "build record");
            }
            tracing::info!(file_ref = %report.ids.file_ref, "file reference");
        }
        InsertOutcome::AlreadyPresent { .. } => println!("{name} already in project"),
    }
    Ok(())
}

fn verify(outcome: &InsertOutcome, plan: &InsertionPlan) -> Result<(), pbx_manifest::InsertError> {
    match outcome {
        InsertOutcome::Added(report) => {
            verify_references(&report.text, plan.entity().display_name(), &report.ids).into_result()
        }
        InsertOutcome::AlreadyPresent { .. } => Ok(()),
    }
}
