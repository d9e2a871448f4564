//! `-option argument...` extraction from a command's tokens.

use std::collections::BTreeMap;

use therion_common::error::{Result, TherionError};

use super::lexer::{Token, TokenKind};

/// A command split into positional arguments and named options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Tokens before the first option marker (command word included).
    pub positional: Vec<String>,
    /// Every occurrence of each option, in order, with its arguments.
    pub options: BTreeMap<String, Vec<Vec<String>>>,
}

impl CommandOptions {
    /// All occurrences of an option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Vec<String>]> {
        self.options.get(name).map(Vec::as_slice)
    }

    /// Arguments of the first occurrence of an option.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(<[_]>::first).map(Vec::as_slice)
    }

    /// Whether the option appeared at least once.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }
}

/// Returns the option name if the token is a `-name` marker.
///
/// Only bare tokens qualify, and the dash must be followed by a letter so
/// that negative numbers stay arguments.
fn option_name(token: &Token) -> Option<&str> {
    if token.kind() != TokenKind::Bare {
        return None;
    }
    let name = token.value().strip_prefix('-')?;
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        .then_some(name)
}

/// Collects option markers and their argument lists.
///
/// # Errors
///
/// Returns a syntax error if an option is followed by no arguments.
pub fn extract_options(tokens: &[Token]) -> Result<CommandOptions> {
    let mut result = CommandOptions::default();
    let mut current: Option<(&str, Vec<String>)> = None;

    for token in tokens {
        if let Some(name) = option_name(token) {
            if let Some((prev, args)) = current.take() {
                push_option(&mut result, prev, args)?;
            }
            current = Some((name, Vec::new()));
            continue;
        }
        match current.as_mut() {
            Some((_, args)) => args.push(token.value().to_string()),
            None => result.positional.push(token.value().to_string()),
        }
    }
    if let Some((name, args)) = current {
        push_option(&mut result, name, args)?;
    }

    Ok(result)
}

fn push_option(result: &mut CommandOptions, name: &str, args: Vec<String>) -> Result<()> {
    if args.is_empty() {
        return Err(TherionError::syntax(format!(
            "option -{name} has no arguments"
        )));
    }
    result
        .options
        .entry(name.to_string())
        .or_default()
        .push(args);
    Ok(())
}
