//! Populates a [`SurveyTree`] from parsed source lines.
//!
//! Survey blocks become surveys and centreline blocks become centrelines.
//! Stations are harvested from the `from`, `to`, and `station` columns of
//! each centreline's data rows, and from explicit `station` commands.

use std::collections::HashSet;

use therion_common::constants::REFERENCE_SEPARATOR;
use therion_common::error::{Result, TherionError};

use crate::context::{ContextBlock, extract_contexts};
use crate::parser::{ContextTag, LogicalLine, Token};
use crate::survey::{CentrelineId, SurveyId, SurveyTree};

/// Columns of a `data` header that carry station names.
const STATION_COLUMNS: [&str; 3] = ["from", "to", "station"];

/// Centreline commands whose lines are never data rows.
const CENTRELINE_COMMANDS: &[&str] = &[
    "break",
    "calibrate",
    "copyright",
    "cs",
    "date",
    "declination",
    "equate",
    "explo-date",
    "explo-team",
    "extend",
    "fix",
    "flags",
    "grade",
    "group",
    "endgroup",
    "infer",
    "instrument",
    "mark",
    "sd",
    "team",
    "title",
    "units",
    "vthreshold",
    "walls",
];

/// Builds the survey hierarchy of a document.
///
/// Centrelines that sit outside every survey are skipped with a warning.
///
/// # Errors
///
/// Returns a syntax error for malformed blocks or a survey with no name.
pub fn build_hierarchy(lines: Vec<LogicalLine>) -> Result<SurveyTree> {
    tracing::info!(lines = lines.len(), "building survey hierarchy");
    let mut tree = SurveyTree::new();
    populate(&mut tree, lines, None, 0)?;
    tracing::debug!(
        surveys = tree.survey_count(),
        stations = tree.station_count(),
        "survey hierarchy built"
    );
    Ok(tree)
}

fn populate(
    tree: &mut SurveyTree,
    lines: Vec<LogicalLine>,
    parent: Option<SurveyId>,
    depth: usize,
) -> Result<()> {
    for block in extract_contexts(lines, depth)?.into_blocks() {
        match (block.tag(), parent) {
            (ContextTag::Survey, _) => {
                let name = survey_name(&block)?;
                let id = match parent {
                    Some(p) => tree.add_survey(p, name)?,
                    None => tree.add_root(name),
                };
                populate(tree, block.into_interior(), Some(id), depth + 1)?;
            }
            (ContextTag::Centreline, Some(survey)) => {
                let centreline = tree.add_centreline(survey)?;
                harvest_stations(tree, centreline, block.interior())?;
            }
            (ContextTag::Centreline, None) => {
                tracing::warn!(
                    line = ?block.header().and_then(LogicalLine::line_number),
                    "centreline outside any survey ignored"
                );
            }
            _ => {}
        }
    }
    Ok(())
}

fn survey_name(block: &ContextBlock) -> Result<String> {
    block.name()?.ok_or_else(|| {
        TherionError::syntax_at(
            block.header().and_then(LogicalLine::line_number),
            "survey without a name",
        )
    })
}

fn harvest_stations(
    tree: &mut SurveyTree,
    centreline: CentrelineId,
    lines: &[LogicalLine],
) -> Result<()> {
    let mut columns: Vec<usize> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for line in lines {
        let tokens = line.tokens()?;
        let Some(first) = tokens.first() else {
            continue;
        };
        let word = first.value().to_ascii_lowercase();

        if word == "data" {
            columns = data_columns(&tokens);
            continue;
        }
        if word == "station" {
            if let Some(name) = tokens.get(1) {
                add_once(tree, centreline, &mut seen, name.value())?;
            }
            continue;
        }
        if CENTRELINE_COMMANDS.contains(&word.as_str()) {
            continue;
        }
        for &col in &columns {
            if let Some(token) = tokens.get(col) {
                add_once(tree, centreline, &mut seen, token.value())?;
            }
        }
    }
    Ok(())
}

/// Row positions of the station columns declared by a `data` header.
///
/// The header is `data <style> <column>...`, so rows start at the third token.
fn data_columns(tokens: &[Token]) -> Vec<usize> {
    tokens
        .iter()
        .skip(2)
        .enumerate()
        .filter(|(_, t)| {
            STATION_COLUMNS
                .iter()
                .any(|c| c.eq_ignore_ascii_case(t.value()))
        })
        .map(|(idx, _)| idx)
        .collect()
}

fn add_once(
    tree: &mut SurveyTree,
    centreline: CentrelineId,
    seen: &mut HashSet<String>,
    name: &str,
) -> Result<()> {
    // "-" and "." mark anonymous splay ends; qualified names live elsewhere
    if name == "-" || name == "." || name.contains(REFERENCE_SEPARATOR) {
        return Ok(());
    }
    if seen.insert(name.to_string()) {
        let _ = tree.add_station(centreline, name)?;
    }
    Ok(())
}
