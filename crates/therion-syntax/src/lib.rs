//! # therion-syntax
//!
//! Text core for Therion cave-survey source files.
//!
//! Handles:
//! - **Parser**: Physical lines to logical lines, tokens, and options, and back.
//! - **Context**: Partitioning a line sequence into nested keyword blocks.
//! - **Survey / Hierarchy**: An arena of surveys, centrelines, and stations
//!   built from parsed blocks.
//! - **Resolver**: `id@survey.path` references between surveys.
//! - **Import**: Recursive `input` expansion with encoding reconciliation.
//! - **Graph**: The include graph recorded during expansion.

pub mod context;
pub mod encoding;
pub mod fetch;
pub mod graph;
pub mod hierarchy;
pub mod import;
pub mod parser;
pub mod resolver;
pub mod survey;
