//! Grammar command - print the effective grammar as JSON.

use crate::config::ApyConfig;
use clap::Args;
use std::path::PathBuf;

/// Grammar command arguments
#[derive(Args, Debug)]
pub struct GrammarArgs {
    /// Config file (default: ./apyconfig.json if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Grammar JSON file, overriding the config
    #[arg(short, long)]
    pub grammar: Option<PathBuf>,
}

/// Print the grammar a build with the same arguments would use.
pub fn run(args: GrammarArgs) -> i32 {
    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| ApyConfig::load(args.config.as_deref(), &cwd))
        .and_then(|config| config.grammar(args.grammar.as_deref()));

    let grammar = match result {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("error: {e:#}");
            return 2;
        }
    };

    match serde_json::to_string_pretty(&grammar) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}
