//! `thc resolve` — Resolve a station reference against the survey hierarchy.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use therion_common::config::ParseConfig;
use therion_common::constants::PATH_SEPARATOR;
use therion_syntax::hierarchy::build_hierarchy;
use therion_syntax::survey::{SurveyId, SurveyTree};

/// Arguments for the `resolve` command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path to the Therion source file.
    pub file: PathBuf,

    /// Reference to resolve, e.g. `12@upper.north`.
    pub reference: String,

    /// Dot-separated path of the survey the reference is written in.
    /// Defaults to the only top-level survey.
    #[arg(long)]
    pub from: Option<String>,
}

/// Executes the `resolve` command, printing the fully qualified reference.
///
/// # Errors
///
/// Returns an error if the viewing survey cannot be found or the
/// reference does not resolve.
pub fn execute(args: &ResolveArgs, config: &ParseConfig) -> anyhow::Result<()> {
    let lines = super::load_expanded(&args.file, None, config)?;
    let tree = build_hierarchy(lines)?;
    let viewer = viewing_survey(&tree, args.from.as_deref())?;

    let station = tree.resolve(&args.reference, viewer)?;
    println!("{}", tree.reference_to(&station, None)?);
    Ok(())
}

fn viewing_survey(tree: &SurveyTree, from: Option<&str>) -> anyhow::Result<SurveyId> {
    if let Some(path) = from {
        let names: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        return tree
            .find_path(&names)?
            .with_context(|| format!("no survey at {path}"));
    }
    let roots: Vec<SurveyId> = tree.roots().collect();
    match roots.as_slice() {
        [only] => Ok(*only),
        [] => anyhow::bail!("file declares no survey"),
        _ => anyhow::bail!("file has {} top-level surveys; pick one with --from", roots.len()),
    }
}
