//! Build command - compile an entry file and everything it imports.

use crate::config::{ApyConfig, DEFAULT_OUT_DIR};
use anyhow::{Context, Result};
use apy_transpile::{
    CompileError, CompileOptions, FsFrontEnd, TYPESCRIPT_READER, compile_project,
};
use clap::Args;
use indexmap::IndexMap;
use std::path::PathBuf;

const USAGE: &str = "usage: apy build [ENTRY] [--config FILE] [--out-dir DIR] [--grammar FILE]";

/// Build command arguments
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Entry file (overrides `entry` in the config)
    pub entry: Option<PathBuf>,

    /// Config file (default: ./apyconfig.json if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory (default: dist)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Grammar JSON file, overriding the config
    #[arg(short, long)]
    pub grammar: Option<PathBuf>,

    /// Also print each generated unit to stdout
    #[arg(long)]
    pub print: bool,
}

/// Everything a build needs after merging CLI flags over the config.
#[derive(Debug)]
struct BuildPlan {
    options: CompileOptions,
    base_url: Option<PathBuf>,
    paths: IndexMap<String, Vec<String>>,
}

fn plan(args: &BuildArgs) -> Result<BuildPlan> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config = ApyConfig::load(args.config.as_deref(), &cwd)?;
    let grammar = config.grammar(args.grammar.as_deref())?;

    let entry = args
        .entry
        .clone()
        .or_else(|| config.entry.clone())
        .context("no entry file given (pass ENTRY or set `entry` in apyconfig.json)")?;
    let out_dir = args
        .out_dir
        .clone()
        .or_else(|| config.out_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));

    Ok(BuildPlan {
        options: CompileOptions::new(entry, out_dir).with_grammar(grammar),
        base_url: config.base_url,
        paths: config.paths,
    })
}

/// Run the build. Exit code 0 on success, 1 if any unit failed, 2 on
/// configuration faults.
pub fn run(args: BuildArgs) -> i32 {
    let plan = match plan(&args) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("error: {e:#}");
            eprintln!("{USAGE}");
            return 2;
        }
    };

    let options = &plan.options;
    let mut front_end =
        FsFrontEnd::new(&TYPESCRIPT_READER, &options.grammar).with_paths(plan.paths);
    if let Some(base_url) = plan.base_url {
        front_end = front_end.with_base_url(base_url);
    }

    let report = match compile_project(options, &front_end) {
        Ok(report) => report,
        Err(e @ (CompileError::EntryNotFound(_) | CompileError::Read { .. })) => {
            eprintln!("error: {e}");
            eprintln!("{USAGE}");
            return 2;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    for diagnostic in report.diagnostics() {
        eprintln!("{diagnostic}");
    }

    for unit in &report.units {
        if let Some(output) = &unit.output_path {
            tracing::info!(
                source = %unit.source_path.display(),
                output = %output.display(),
                "wrote unit"
            );
        }
        if args.print {
            println!("# {}", unit.source_path.display());
            print!("{}", unit.generated);
        }
    }

    if report.has_failures() { 1 } else { 0 }
}
