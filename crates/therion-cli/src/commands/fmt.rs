//! `thc fmt` — Re-serialize a file in normalized form.
//!
//! Wrapped statements are joined onto one line and line endings follow
//! the configuration; everything else is written back unchanged.

use std::path::PathBuf;

use clap::Args;
use therion_common::config::ParseConfig;

/// Arguments for the `fmt` command.
#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Path to the Therion source file.
    pub file: PathBuf,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `fmt` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or written.
pub fn execute(args: &FmtArgs, config: &ParseConfig) -> anyhow::Result<()> {
    let lines = super::read_lines(&args.file)?;
    super::emit(&lines, args.output.as_deref(), config)
}
