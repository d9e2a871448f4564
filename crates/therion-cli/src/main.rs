//! # thc — Therion core CLI
//!
//! Checks, normalizes, and expands Therion survey source files.
//! Set `RUST_LOG=debug` to trace expansion and block extraction.

mod commands;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
