//! pbxpatch - register source files in Xcode projects

mod commands;
mod logging;
mod plan;

use anyhow::{anyhow, Result};
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use commands::add_file::{AddFileArgs, PlanSource};
use commands::fix_logging::{FixLoggingArgs, RuleSource};
use commands::{exit_code, EXIT_OK};
use pbx_logfix::Preset;
use plan::FlagPlan;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("pbxpatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Register source files in Xcode project manifests without a full parse")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(
            Command::new("add-file")
                .about("Add a file next to an existing anchor file in every section")
                .arg(
                    Arg::new("project")
                        .long("project")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("project.pbxproj, or the .xcodeproj directory"),
                )
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with_all(["name", "anchor"])
                        .help("TOML insertion plan"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .requires_all(["anchor", "anchor-file-ref", "anchor-build-file"])
                        .help("Display name of the new file, e.g. B.swift"),
                )
                .arg(Arg::new("anchor").long("anchor").help("Display name of the anchor file"))
                .arg(
                    Arg::new("anchor-file-ref")
                        .long("anchor-file-ref")
                        .help("PBXFileReference id of the anchor"),
                )
                .arg(
                    Arg::new("anchor-build-file")
                        .long("anchor-build-file")
                        .help("PBXBuildFile id of the anchor in the main target"),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .default_value("main")
                        .help("Name of the main target, used in messages"),
                )
                .arg(
                    Arg::new("aux-target")
                        .long("aux-target")
                        .requires("aux-anchor-build-file")
                        .help("Second target to register the file in"),
                )
                .arg(
                    Arg::new("aux-anchor-build-file")
                        .long("aux-anchor-build-file")
                        .requires("aux-target")
                        .help("PBXBuildFile id of the anchor in the second target"),
                )
                .arg(
                    Arg::new("file-type")
                        .long("file-type")
                        .help("lastKnownFileType, inferred from the extension when absent"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the records that would be added without writing"),
                )
                .arg(
                    Arg::new("no-verify")
                        .long("no-verify")
                        .action(ArgAction::SetTrue)
                        .help("Skip the cross-reference audit before writing"),
                )
                .group(
                    ArgGroup::new("source")
                        .args(["plan", "name"])
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("fix-logging")
                .about("Repair malformed logger calls and promote severities by message content")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Swift source to rewrite"),
                )
                .arg(
                    Arg::new("preset")
                        .long("preset")
                        .value_parser(["app", "tts"])
                        .help("Built-in rule set"),
                )
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML rule file"),
                )
                .arg(
                    Arg::new("strip-prefix")
                        .long("strip-prefix")
                        .help("Message prefix to remove, overriding the rule set's"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Report what would change without writing"),
                )
                .group(
                    ArgGroup::new("rule-source")
                        .args(["preset", "rules"])
                        .required(true),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("add-file", args)) => add_file_args(args).and_then(commands::add_file::run),
        Some(("fix-logging", args)) => fix_logging_args(args).and_then(commands::fix_logging::run),
        _ => Err(anyhow!("no subcommand given")),
    };

    let code = match result {
        Ok(()) => EXIT_OK,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

fn required<T: Clone + Send + Sync + 'static>(args: &ArgMatches, id: &str) -> Result<T> {
    args.get_one::<T>(id)
        .cloned()
        .ok_or_else(|| anyhow!("missing --{id}"))
}

fn add_file_args(args: &ArgMatches) -> Result<AddFileArgs> {
    let plan = match args.get_one::<PathBuf>("plan") {
        Some(path) => PlanSource::File(path.clone()),
        None => PlanSource::Flags(FlagPlan {
            name: required(args, "name")?,
            anchor: required(args, "anchor")?,
            anchor_file_ref: required(args, "anchor-file-ref")?,
            target: required(args, "target")?,
            anchor_build_file: required(args, "anchor-build-file")?,
            aux_target: args.get_one::<String>("aux-target").cloned(),
            aux_anchor_build_file: args.get_one::<String>("aux-anchor-build-file").cloned(),
            file_type: args.get_one::<String>("file-type").cloned(),
        }),
    };
    Ok(AddFileArgs {
        project: required(args, "project")?,
        plan,
        dry_run: args.get_flag("dry-run"),
        verify: !args.get_flag("no-verify"),
    })
}

fn fix_logging_args(args: &ArgMatches) -> Result<FixLoggingArgs> {
    let rules = match args.get_one::<String>("preset") {
        Some(name) => RuleSource::Preset(name.parse::<Preset>()?),
        None => RuleSource::File(required(args, "rules")?),
    };
    Ok(FixLoggingArgs {
        file: required(args, "file")?,
        rules,
        strip_prefix: args.get_one::<String>("strip-prefix").cloned(),
        dry_run: args.get_flag("dry-run"),
    })
}
