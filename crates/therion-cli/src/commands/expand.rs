//! `thc expand` — Write a file with its `input` directives expanded.

use std::path::PathBuf;

use clap::Args;
use therion_common::config::ParseConfig;

/// Arguments for the `expand` command.
#[derive(Args, Debug)]
pub struct ExpandArgs {
    /// Path to the Therion source file.
    pub file: PathBuf,

    /// Maximum inclusion depth; unbounded when omitted.
    #[arg(short, long, allow_negative_numbers = true)]
    pub depth: Option<i64>,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `expand` command.
///
/// # Errors
///
/// Returns an error if any included file fails to load or the depth is
/// negative.
pub fn execute(args: &ExpandArgs, config: &ParseConfig) -> anyhow::Result<()> {
    let lines = super::load_expanded(&args.file, args.depth, config)?;
    super::emit(&lines, args.output.as_deref(), config)
}
