//! Command-line interface for blockfix
//! Applies the built-in rule sets to task files, in place or as a check.
//!
//! Usage:
//!   blockfix [PATHS]...                 - Fix every YAML file under PATHS (default: .)
//!   blockfix --check [PATHS]...         - Report files that would change, exit 1 if any
//!   blockfix --diff [PATHS]...          - Print the changes as unified diffs
//!   blockfix --list-rules               - List the available rule sets
//!
//! Exit codes: 0 success, 1 file errors (or pending changes under --check/--diff),
//! 2 usage or configuration errors.

mod batch;
mod discover;
mod error;
mod persist;
mod report;

use batch::{RunContext, RunMode};
use blockfix_config::{BlockfixConfig, Loader, REPO_CONFIG_FILE};
use blockfix_engine::RuleRegistry;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use error::CliError;
use persist::WriteMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = build_cli().get_matches();
    init_logging(&matches);

    let code = match run(&matches) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("blockfix: {err}");
            2
        }
    };
    std::process::exit(code);
}

fn build_cli() -> Command {
    Command::new("blockfix")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Structural fixer for Ansible task files")
        .arg(
            Arg::new("paths")
                .help("Files or directories to fix")
                .num_args(0..)
                .value_parser(value_parser!(PathBuf))
                .default_value("."),
        )
        .arg(
            Arg::new("rules")
                .long("rules")
                .short('r')
                .help("Comma-separated rule sets to run, in order (overrides the configuration)")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("list-rules")
                .long("list-rules")
                .help("List available rule sets")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Do not write; exit 1 if any file would change")
                .action(ArgAction::SetTrue)
                .conflicts_with("diff"),
        )
        .arg(
            Arg::new("diff")
                .long("diff")
                .help("Do not write; print a unified diff for every file that would change")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("backup")
                .long("backup")
                .help("Keep the original of every rewritten file next to it")
                .action(ArgAction::SetTrue)
                .conflicts_with("no-backup"),
        )
        .arg(
            Arg::new("no-backup")
                .long("no-backup")
                .help("Do not keep backups, even if the configuration asks for them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults and .blockfix.toml")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("max-width")
                .long("max-width")
                .help("Reflow lines wider than this many characters")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .short('j')
                .help("Worker threads (0: one per core)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the report as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every file, changed or not")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only log warnings and errors")
                .action(ArgAction::SetTrue),
        )
}

/// Logs go to stderr so the report on stdout stays machine-readable.
fn init_logging(matches: &ArgMatches) {
    let default_level = if matches.get_flag("verbose") {
        "debug"
    } else if matches.get_flag("quiet") {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<BlockfixConfig, CliError> {
    let mut loader = Loader::new().with_optional_file(REPO_CONFIG_FILE);
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }

    if let Some(rules) = matches.get_many::<String>("rules") {
        let names: Vec<String> = rules
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        loader = loader.set_override("rules.enabled", names)?;
    }
    if let Some(&width) = matches.get_one::<usize>("max-width") {
        let value = i64::try_from(width)
            .ok()
            .filter(|w| *w > 0)
            .ok_or_else(|| CliError::InvalidFlag {
                flag: "max-width",
                value: width.to_string(),
            })?;
        loader = loader.set_override("rules.line_length.max_width", value)?;
    }
    if let Some(&jobs) = matches.get_one::<usize>("jobs") {
        let value = i64::try_from(jobs).map_err(|_| CliError::InvalidFlag {
            flag: "jobs",
            value: jobs.to_string(),
        })?;
        loader = loader.set_override("batch.jobs", value)?;
    }
    if matches.get_flag("backup") {
        loader = loader.set_override("write.backup", true)?;
    } else if matches.get_flag("no-backup") {
        loader = loader.set_override("write.backup", false)?;
    }

    Ok(loader.build()?)
}

fn run(matches: &ArgMatches) -> Result<i32, CliError> {
    let config = load_config(matches)?;
    let registry = RuleRegistry::with_options(&config.rules.options());

    if matches.get_flag("list-rules") {
        handle_list_rules_command(&registry, &config);
        return Ok(0);
    }

    let rule_sets = registry.resolve(&config.rules.enabled)?;
    let mode = if matches.get_flag("check") {
        RunMode::Check
    } else if matches.get_flag("diff") {
        RunMode::Diff
    } else if config.write.backup {
        RunMode::Write(WriteMode::Backup {
            suffix: config.write.backup_suffix.clone(),
        })
    } else {
        RunMode::Write(WriteMode::Replace)
    };

    let paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("paths")
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default();
    let files = discover::discover(&paths, &config.discovery);
    tracing::debug!(files = files.len(), rule_sets = rule_sets.len(), "starting run");

    let ctx = RunContext::new(rule_sets, mode);
    let reports = if config.batch.jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.batch.jobs)
            .build()?;
        pool.install(|| ctx.run(&files))
    } else {
        ctx.run(&files)
    };
    let summary = ctx.summary();

    if matches.get_flag("json") {
        match report::to_json(&reports, &summary) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error formatting report: {err}");
                return Ok(1);
            }
        }
    } else {
        for diff in reports.iter().filter_map(|r| r.diff.as_deref()) {
            print!("{diff}");
        }
        print!("{}", report::to_text(&reports, &summary, !ctx.mode().writes()));
    }

    let pending = !ctx.mode().writes() && summary.changed > 0;
    Ok(if summary.errored > 0 || pending { 1 } else { 0 })
}

/// Handle the list-rules command
fn handle_list_rules_command(registry: &RuleRegistry, config: &BlockfixConfig) {
    println!("Available rule sets:\n");

    for set in registry.list_all() {
        let marker = if config.rules.enabled.iter().any(|name| name == set.name()) {
            "*"
        } else {
            " "
        };
        println!("  {marker} {:<18} {}", set.name(), set.description());
    }
    println!("\n  * enabled");
}
