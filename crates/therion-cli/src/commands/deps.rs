//! `thc deps` — List included files in dependency order.

use std::path::PathBuf;

use clap::Args;
use therion_common::config::ParseConfig;
use therion_syntax::fetch::FsFetcher;
use therion_syntax::import::Includer;

/// Arguments for the `deps` command.
#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Path to the Therion source file.
    pub file: PathBuf,
}

/// Executes the `deps` command.
///
/// Included files are printed before the files that include them, so the
/// last line is always `file` itself.
///
/// # Errors
///
/// Returns an error if any file in the chain fails to load.
pub fn execute(args: &DepsArgs, config: &ParseConfig) -> anyhow::Result<()> {
    let mut includer = Includer::new(FsFetcher, config);
    let _ = includer.load(&args.file, None)?;
    let graph = includer.into_graph();

    for path in graph.resolve_order()? {
        let includes = graph.includes(&path);
        if includes.is_empty() {
            println!("{}", path.display());
        } else {
            let names: Vec<String> = includes.iter().map(|p| p.display().to_string()).collect();
            println!("{} <- {}", path.display(), names.join(", "));
        }
    }
    Ok(())
}
