//! Line and token engine for Therion source text.
//!
//! Turns raw physical lines into [`LogicalLine`]s and their quoting-aware
//! [`Token`]s, and serializes them back without losing layout.

pub mod keywords;
pub mod lexer;
pub mod line;
pub mod options;

use therion_common::config::ParseConfig;
use therion_common::error::Result;

pub use self::keywords::{ContextTag, Directive};
pub use self::lexer::{Token, TokenKind, escape, tokenize, unescape};
pub use self::line::{Fragment, LogicalLine, parse_lines, parse_text, serialize_lines};
pub use self::options::{CommandOptions, extract_options};

/// Parses a whole source text into logical lines.
///
/// # Errors
///
/// Returns a syntax error if a physical line cannot be split.
pub fn parse_source(input: &str) -> Result<Vec<LogicalLine>> {
    tracing::info!(bytes = input.len(), "parsing therion source");
    let lines = parse_text(input)?;
    tracing::debug!(lines = lines.len(), "reconstructed logical lines");
    Ok(lines)
}

/// Serializes logical lines with the configured terminator.
#[must_use]
pub fn write_source(lines: &[LogicalLine], config: &ParseConfig) -> String {
    serialize_lines(lines, config.line_ending)
}
