//! Include graph built with `petgraph`.
//!
//! Records which file pulls in which during input expansion, rejects
//! cycles as they are discovered, and yields files in dependency order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use therion_common::error::{Result, TherionError};

/// A directed graph of source files and their inclusions.
#[derive(Debug, Default)]
pub struct IncludeGraph {
    /// Edges point from an included file to its includer.
    graph: DiGraph<PathBuf, ()>,
    nodes: HashMap<PathBuf, NodeIndex>,
}

impl IncludeGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file node, returning the existing one if already present.
    pub fn add_file(&mut self, path: &Path) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(path) {
            return idx;
        }
        let idx = self.graph.add_node(path.to_path_buf());
        let _ = self.nodes.insert(path.to_path_buf(), idx);
        idx
    }

    /// Records that `includer` pulls in `target`.
    ///
    /// The edge points from `target` to `includer` so that a topological
    /// sort yields included files first.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if `target` already includes `includer`,
    /// directly or transitively.
    pub fn add_inclusion(&mut self, includer: &Path, target: &Path) -> Result<()> {
        let from = self.add_file(includer);
        let to = self.add_file(target);
        if from == to || petgraph::algo::has_path_connecting(&self.graph, from, to, None) {
            return Err(TherionError::syntax(format!(
                "cyclic input: {} includes {}, which already includes it",
                includer.display(),
                target.display()
            )));
        }
        let _ = self.graph.update_edge(to, from, ());
        Ok(())
    }

    /// Files in dependency order, included files before their includers.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains a cycle.
    pub fn resolve_order(&self) -> Result<Vec<PathBuf>> {
        petgraph::algo::toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                    .collect()
            })
            .map_err(|_cycle| TherionError::unexpected_state("cyclic include graph"))
    }

    /// Files directly included by `path`.
    #[must_use]
    pub fn includes(&self, path: &Path) -> Vec<&Path> {
        let Some(&idx) = self.nodes.get(path) else {
            return Vec::new();
        };
        let mut targets: Vec<&Path> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).map(PathBuf::as_path))
            .collect();
        targets.sort();
        targets
    }

    /// Number of distinct files seen.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }
}
