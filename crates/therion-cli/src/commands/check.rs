//! `thc check` — Parse, expand, and structure a file, reporting what was found.

use std::path::PathBuf;

use clap::Args;
use therion_common::config::ParseConfig;
use therion_syntax::context::build_block_tree;
use therion_syntax::hierarchy::build_hierarchy;

use crate::output::{count_blocks, plural};

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the Therion source file.
    pub file: PathBuf,
}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns an error on the first syntax, I/O, encoding, or structure problem.
pub fn execute(args: &CheckArgs, config: &ParseConfig) -> anyhow::Result<()> {
    tracing::info!(file = %args.file.display(), "checking source file");
    let lines = super::load_expanded(&args.file, None, config)?;
    let line_count = lines.len();
    let blocks = build_block_tree(lines.clone())?;
    let tree = build_hierarchy(lines)?;

    println!("{}: ok", args.file.display());
    println!("  {}", plural(line_count, "logical line"));
    println!("  {}", plural(count_blocks(&blocks), "block"));
    println!("  {}", plural(tree.roots().count(), "top-level survey"));
    println!("  {}", plural(tree.station_count(), "station"));
    Ok(())
}
