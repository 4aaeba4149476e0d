//! `pbxpatch fix-logging`

use anyhow::{Context, Result};
use pbx_logfix::{LogRewriter, Preset, Rewrite};
use pbx_store::{mutate_in_place, ApplyOptions};
use std::fs;
use std::path::PathBuf;

/// Where the severity rules come from
#[derive(Debug, Clone)]
pub(crate) enum RuleSource {
    Preset(Preset),
    File(PathBuf),
}

/// Parsed `fix-logging` arguments
#[derive(Debug, Clone)]
pub(crate) struct FixLoggingArgs {
    pub(crate) file: PathBuf,
    pub(crate) rules: RuleSource,
    pub(crate) strip_prefix: Option<String>,
    pub(crate) dry_run: bool,
}

pub(crate) fn run(args: FixLoggingArgs) -> Result<()> {
    let mut rewriter = match &args.rules {
        RuleSource::Preset(preset) => LogRewriter::from_preset(*preset),
        RuleSource::File(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read rules {}", path.display()))?;
            LogRewriter::from_toml(&text)
                .with_context(|| format!("invalid rules {}", path.display()))?
        }
    };
    if let Some(prefix) = args.strip_prefix {
        rewriter = rewriter.with_strip_prefix(prefix);
    }
    // Surface bad patterns before taking the lock.
    rewriter.rewrite("").context("invalid rules")?;

    let options = ApplyOptions {
        dry_run: args.dry_run,
    };
    let result = mutate_in_place(&args.file, options, |text| {
        let rewrite = rewriter.rewrite(text)?;
        let new_text = rewrite.is_changed().then(|| rewrite.text.clone());
        Ok::<_, anyhow::Error>((rewrite, new_text))
    })?;

    report(&args.file, &result.value, args.dry_run);
    Ok(())
}

fn report(file: &std::path::Path, rewrite: &Rewrite, dry_run: bool) {
    let name = file
        .file_name()
        .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
    if !rewrite.is_changed() {
        println!("{name}: logging already clean");
        return;
    }
    tracing::info!(
        normalized = rewrite.normalized,
        promoted = rewrite.promoted_total(),
        stripped = rewrite.stripped,
        "rewrite summary"
    );
    if dry_run {
        println!("Would fix logging in {name} (dry run)");
    } else {
        println!("Fixed logging in {name}");
    }
}
