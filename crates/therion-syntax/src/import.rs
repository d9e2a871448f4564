//! `input` directive expansion.
//!
//! Each `input <path>` line is turned into a comment recording the original
//! statement, and the included file's lines are spliced in right after it.
//! Included files are expanded recursively up to a depth limit, their first
//! `encoding` line is dropped, and their text is re-encoded to the
//! includer's declared encoding.

use std::path::{Component, Path, PathBuf};

use therion_common::config::ParseConfig;
use therion_common::error::{Result, TherionError};
use therion_common::types::Encoding;

use crate::encoding::{
    CheckedTranscoder, Transcoder, declared_encoding, find_encoding, transcode_lines,
};
use crate::fetch::SourceFetcher;
use crate::graph::IncludeGraph;
use crate::parser::{Directive, LogicalLine, parse_lines};

/// Expands `input` directives using a fetcher and a transcoder.
#[derive(Debug)]
pub struct Includer<'c, F, T = CheckedTranscoder> {
    fetcher: F,
    transcoder: T,
    config: &'c ParseConfig,
    graph: IncludeGraph,
}

impl<'c, F: SourceFetcher> Includer<'c, F> {
    /// Creates an includer with the default representability-checking
    /// transcoder.
    #[must_use]
    pub fn new(fetcher: F, config: &'c ParseConfig) -> Self {
        Self {
            fetcher,
            transcoder: CheckedTranscoder,
            config,
            graph: IncludeGraph::new(),
        }
    }
}

impl<'c, F: SourceFetcher, T: Transcoder> Includer<'c, F, T> {
    /// Replaces the transcoder.
    #[must_use]
    pub fn with_transcoder<U: Transcoder>(self, transcoder: U) -> Includer<'c, F, U> {
        Includer {
            fetcher: self.fetcher,
            transcoder,
            config: self.config,
            graph: self.graph,
        }
    }

    /// Inclusions recorded so far.
    #[must_use]
    pub const fn graph(&self) -> &IncludeGraph {
        &self.graph
    }

    /// Consumes the includer, keeping its include graph.
    #[must_use]
    pub fn into_graph(self) -> IncludeGraph {
        self.graph
    }

    /// Expands every `input` directive in `buffer`.
    ///
    /// `origin` is the path `buffer` was read from; relative input paths are
    /// resolved against its directory. `depth` bounds the recursion: `0`
    /// leaves the buffer untouched, `1` expands only its own directives, and
    /// `None` falls back to the configured limit (unbounded by default).
    ///
    /// # Errors
    ///
    /// Returns an unexpected-state error for a negative depth. Otherwise
    /// returns the first syntax, I/O, or encoding error met in any file,
    /// including a syntax error for cyclic inclusion.
    pub fn expand(
        &mut self,
        buffer: &mut Vec<LogicalLine>,
        origin: &Path,
        depth: Option<i64>,
    ) -> Result<()> {
        let depth = self.depth_limit(depth)?;
        let origin = normalize(origin);
        tracing::info!(origin = %origin.display(), ?depth, "expanding input directives");
        let encoding = declared_encoding(buffer, self.config)?;
        let _ = self.graph.add_file(&origin);
        self.expand_buffer(buffer, &origin, encoding, depth)
    }

    /// Reads `path` and expands its directives.
    ///
    /// # Errors
    ///
    /// See [`Includer::expand`].
    pub fn load(&mut self, path: &Path, depth: Option<i64>) -> Result<Vec<LogicalLine>> {
        let mut lines = parse_lines(self.fetcher.fetch(path)?)?;
        self.expand(&mut lines, path, depth)?;
        Ok(lines)
    }

    fn depth_limit(&self, depth: Option<i64>) -> Result<Option<u64>> {
        match depth {
            Some(d) => u64::try_from(d).map(Some).map_err(|_| {
                TherionError::unexpected_state(format!("negative input depth {d}"))
            }),
            None => Ok(self.config.max_include_depth.map(u64::from)),
        }
    }

    fn expand_buffer(
        &mut self,
        buffer: &mut Vec<LogicalLine>,
        origin: &Path,
        encoding: Encoding,
        depth: Option<u64>,
    ) -> Result<()> {
        if depth == Some(0) {
            return Ok(());
        }

        // back to front, so splicing never shifts a line still to be visited
        for idx in (0..buffer.len()).rev() {
            let line = &buffer[idx];
            let Some(keyword) = line.keyword()? else {
                continue;
            };
            if !Directive::Input.matches(&keyword) {
                continue;
            }
            let tokens = line.tokens()?;
            let raw = tokens.get(1).ok_or_else(|| {
                TherionError::syntax_at(line.line_number(), "input directive without a path")
            })?;
            let target = self.resolve_path(origin, raw.value());
            let marker = comment_out(line);

            self.graph.add_inclusion(origin, &target)?;
            tracing::debug!(
                from = %origin.display(),
                target = %target.display(),
                "including file"
            );

            let mut included = parse_lines(self.fetcher.fetch(&target)?)?;
            let target_encoding = match find_encoding(&included, self.config)? {
                Some((pos, found)) => {
                    let _ = included.remove(pos);
                    found
                }
                None => self.config.default_encoding,
            };
            self.expand_buffer(
                &mut included,
                &target,
                target_encoding,
                depth.map(|d| d - 1),
            )?;
            transcode_lines(&self.transcoder, &mut included, target_encoding, encoding)?;

            let _ = buffer.splice(idx..=idx, std::iter::once(marker).chain(included));
        }
        Ok(())
    }

    fn resolve_path(&self, origin: &Path, raw: &str) -> PathBuf {
        let mut path = PathBuf::from(raw);
        if path.is_relative() {
            if let Some(dir) = origin.parent() {
                path = dir.join(path);
            }
        }
        if path.extension().is_none() {
            let _ = path.set_extension(&self.config.default_extension);
        }
        normalize(&path)
    }
}

/// Folds `.` and `..` components without touching the filesystem, so one
/// file reached through different spellings maps to one graph node.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    let _ = out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    out
}

/// The comment line that stands in for an expanded directive.
///
/// A trailing continuation marker is left out so the comment stays on
/// one line when the output is parsed again.
fn comment_out(line: &LogicalLine) -> LogicalLine {
    let mut text = line.source_text();
    if line.is_continued() {
        let _ = text.pop();
    }
    let marker = LogicalLine::comment_only(line.indent(), text);
    match line.line_number() {
        Some(n) => marker.with_line_number(n),
        None => marker,
    }
}
