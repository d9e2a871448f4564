//! CLI command definitions and dispatch.

pub mod blocks;
pub mod check;
pub mod deps;
pub mod expand;
pub mod fmt;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use therion_common::config::ParseConfig;
use therion_common::constants::BIN_NAME;
use therion_common::types::Encoding;
use therion_syntax::fetch::{FsFetcher, SourceFetcher};
use therion_syntax::import::Includer;
use therion_syntax::parser::{LogicalLine, parse_lines, write_source};

/// thc — Therion survey source toolkit.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file.
    #[arg(long, global = true, env = "THC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Encoding assumed for files without an `encoding` line.
    #[arg(long, global = true)]
    pub encoding: Option<String>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse, expand, and structure a file, reporting what was found.
    Check(check::CheckArgs),
    /// Re-serialize a file in normalized form.
    Fmt(fmt::FmtArgs),
    /// Write a file with its `input` directives expanded.
    Expand(expand::ExpandArgs),
    /// Show the nested block structure of a file.
    Blocks(blocks::BlocksArgs),
    /// Resolve a station reference against the survey hierarchy.
    Resolve(resolve::ResolveArgs),
    /// List included files in dependency order.
    Deps(deps::DepsArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.encoding.as_deref())?;
    match cli.command {
        Command::Check(args) => check::execute(&args, &config),
        Command::Fmt(args) => fmt::execute(&args, &config),
        Command::Expand(args) => expand::execute(&args, &config),
        Command::Blocks(args) => blocks::execute(&args, &config),
        Command::Resolve(args) => resolve::execute(&args, &config),
        Command::Deps(args) => deps::execute(&args, &config),
    }
}

/// Builds the effective configuration from a file and flag overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the encoding is invalid.
pub fn load_config(path: Option<&Path>, encoding: Option<&str>) -> anyhow::Result<ParseConfig> {
    let mut config = match path {
        Some(p) => ParseConfig::load(p)
            .with_context(|| format!("loading configuration from {}", p.display()))?,
        None => ParseConfig::default(),
    };
    if let Some(name) = encoding {
        config.default_encoding = name.parse::<Encoding>()?;
        config.validate()?;
    }
    Ok(config)
}

/// Reads and parses a file without expanding its inputs.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_lines(path: &Path) -> anyhow::Result<Vec<LogicalLine>> {
    let physical = FsFetcher.fetch(path)?;
    parse_lines(physical).with_context(|| format!("parsing {}", path.display()))
}

/// Reads a file and expands its inputs to `depth`.
///
/// # Errors
///
/// Returns an error if any file in the chain cannot be read or parsed.
pub fn load_expanded(
    path: &Path,
    depth: Option<i64>,
    config: &ParseConfig,
) -> anyhow::Result<Vec<LogicalLine>> {
    let mut includer = Includer::new(FsFetcher, config);
    includer
        .load(path, depth)
        .with_context(|| format!("expanding {}", path.display()))
}

/// Writes serialized lines to `output`, or stdout when absent.
///
/// # Errors
///
/// Returns an error if the output file cannot be written.
pub fn emit(
    lines: &[LogicalLine],
    output: Option<&Path>,
    config: &ParseConfig,
) -> anyhow::Result<()> {
    let text = write_source(lines, config);
    match output {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), lines = lines.len(), "wrote output");
        }
        None => print!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_flag_overrides_default() {
        let config = load_config(None, Some("cp1250")).expect("config");
        assert_eq!(config.default_encoding, Encoding::Cp1250);
        assert!(load_config(None, Some("ebcdic")).is_err());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("thc.json");
        std::fs::write(&path, r#"{"default_extension": "thc"}"#).expect("write");
        let config = load_config(Some(path.as_path()), None).expect("config");
        assert_eq!(config.default_extension, "thc");
        assert_eq!(config.default_encoding, Encoding::Utf8);
    }

    #[test]
    fn cli_is_named_after_binary() {
        use clap::CommandFactory;
        assert_eq!(Cli::command().get_name(), BIN_NAME);
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["thc", "--encoding", "ascii", "fmt", "cave.th"])
            .expect("parse");
        assert_eq!(cli.encoding.as_deref(), Some("ascii"));
        assert!(matches!(cli.command, Command::Fmt(_)));
    }
}
