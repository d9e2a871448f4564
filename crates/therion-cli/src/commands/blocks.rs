//! `thc blocks` — Show the nested block structure of a file.

use std::path::PathBuf;

use clap::Args;
use therion_common::config::ParseConfig;
use therion_syntax::context::build_block_tree;

use crate::output::format_block_tree;

/// Arguments for the `blocks` command.
#[derive(Args, Debug)]
pub struct BlocksArgs {
    /// Path to the Therion source file.
    pub file: PathBuf,

    /// Expand `input` directives first.
    #[arg(long)]
    pub expand: bool,

    /// Print the tree as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `blocks` command.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or its blocks are malformed.
pub fn execute(args: &BlocksArgs, config: &ParseConfig) -> anyhow::Result<()> {
    let lines = if args.expand {
        super::load_expanded(&args.file, None, config)?
    } else {
        super::read_lines(&args.file)?
    };
    let tree = build_block_tree(lines)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print!("{}", format_block_tree(&tree));
    }
    Ok(())
}
