//! Partitioning of a flat line sequence into named blocks.
//!
//! [`extract_contexts`] handles exactly one nesting layer: nested blocks of
//! other tags stay inside their enclosing group, and callers recurse on a
//! group's [`ContextBlock::interior`]. [`build_block_tree`] performs that
//! recursion for the whole document.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use therion_common::error::{Result, TherionError};

use crate::parser::keywords::ContextTag;
use crate::parser::line::LogicalLine;
use crate::parser::options::extract_options;

/// One block occurrence: its start line, interior, and end line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    tag: ContextTag,
    lines: Vec<LogicalLine>,
    depth: usize,
}

impl ContextBlock {
    /// The block type.
    #[must_use]
    pub const fn tag(&self) -> ContextTag {
        self.tag
    }

    /// Every line of the block, start and end lines included.
    #[must_use]
    pub fn lines(&self) -> &[LogicalLine] {
        &self.lines
    }

    /// Nesting layer this block was found at (0 for the top level).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The line that opened the block.
    #[must_use]
    pub fn header(&self) -> Option<&LogicalLine> {
        self.lines.first()
    }

    /// The line that closed the block.
    #[must_use]
    pub fn footer(&self) -> Option<&LogicalLine> {
        self.lines.last()
    }

    /// Lines between the start and end lines.
    #[must_use]
    pub fn interior(&self) -> &[LogicalLine] {
        match self.lines.len() {
            0..=2 => &[],
            n => &self.lines[1..n - 1],
        }
    }

    /// Consumes the block, returning the lines between start and end.
    #[must_use]
    pub fn into_interior(mut self) -> Vec<LogicalLine> {
        if self.lines.len() < 2 {
            return Vec::new();
        }
        let _ = self.lines.pop();
        let _ = self.lines.remove(0);
        self.lines
    }

    /// The block's name: the first positional argument after the keyword.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if the start line is malformed.
    pub fn name(&self) -> Result<Option<String>> {
        let Some(header) = self.header() else {
            return Ok(None);
        };
        let options = extract_options(&header.tokens()?)?;
        Ok(options.positional.into_iter().nth(1))
    }
}

/// Result of partitioning one nesting layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    local: Vec<LogicalLine>,
    blocks: Vec<ContextBlock>,
}

impl Extraction {
    /// Lines outside any block at this layer.
    #[must_use]
    pub fn local(&self) -> &[LogicalLine] {
        &self.local
    }

    /// Every block, in the order it was opened.
    #[must_use]
    pub fn blocks(&self) -> &[ContextBlock] {
        &self.blocks
    }

    /// Blocks of one tag, in source order.
    pub fn groups(&self, tag: ContextTag) -> impl Iterator<Item = &ContextBlock> {
        self.blocks.iter().filter(move |b| b.tag == tag)
    }

    /// Tags with at least one block.
    #[must_use]
    pub fn tags(&self) -> BTreeSet<ContextTag> {
        self.blocks.iter().map(|b| b.tag).collect()
    }

    /// Total number of lines across all buckets.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.local.len() + self.blocks.iter().map(|b| b.lines.len()).sum::<usize>()
    }

    /// Splits into the local bucket and a `tag -> groups` map.
    ///
    /// Tags without groups do not appear in the map.
    #[must_use]
    pub fn into_parts(self) -> (Vec<LogicalLine>, BTreeMap<ContextTag, Vec<ContextBlock>>) {
        let mut map: BTreeMap<ContextTag, Vec<ContextBlock>> = BTreeMap::new();
        for block in self.blocks {
            map.entry(block.tag).or_default().push(block);
        }
        (self.local, map)
    }

    /// Consumes the extraction, returning blocks in opening order.
    #[must_use]
    pub fn into_blocks(self) -> Vec<ContextBlock> {
        self.blocks
    }
}

/// Partitions one nesting layer of lines into blocks and local lines.
///
/// `depth` is recorded on each block and used in diagnostics.
///
/// # Errors
///
/// Returns a syntax error on malformed quoting, on an end keyword with no
/// open block, or on a block still open at the end of the sequence.
pub fn extract_contexts(lines: Vec<LogicalLine>, depth: usize) -> Result<Extraction> {
    let mut extraction = Extraction::default();
    // (tag, same-tag depth, start line) of the open block
    let mut active: Option<(ContextTag, usize, Option<usize>)> = None;

    for line in lines {
        let keyword = line.keyword()?;

        let Some((tag, level, opened_at)) = active.as_mut() else {
            if let Some(word) = keyword.as_deref() {
                if let Some(tag) = ContextTag::from_start(word) {
                    tracing::debug!(%tag, depth, line = ?line.line_number(), "opening block");
                    active = Some((tag, 1, line.line_number()));
                    extraction.blocks.push(ContextBlock {
                        tag,
                        lines: vec![line],
                        depth,
                    });
                    continue;
                }
                if let Some(tag) = ContextTag::from_end(word) {
                    return Err(TherionError::syntax_at(
                        line.line_number(),
                        format!("{word} without an open {tag} block"),
                    ));
                }
            }
            extraction.local.push(line);
            continue;
        };

        if let Some(word) = keyword.as_deref() {
            if tag.matches_start(word) {
                *level += 1;
            } else if tag.matches_end(word) {
                *level -= 1;
            }
        }
        let closed = *level == 0;
        let (tag, opened_at) = (*tag, *opened_at);

        let group = extraction.blocks.last_mut().ok_or_else(|| {
            TherionError::unexpected_state(format!("no group recorded for open {tag} block"))
        })?;
        group.lines.push(line);

        if closed {
            tracing::debug!(%tag, depth, from = ?opened_at, "closed block");
            active = None;
        }
    }

    if let Some((tag, _, opened_at)) = active {
        return Err(TherionError::syntax_at(
            opened_at,
            format!("{tag} block is never closed with {}", tag.end_keyword()),
        ));
    }

    Ok(extraction)
}

/// One node of the recursive block structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockNode {
    /// Block type.
    pub tag: ContextTag,
    /// Name from the start line, if any.
    pub name: Option<String>,
    /// Physical line of the start keyword.
    pub line: Option<usize>,
    /// Nesting layer (0 for the top level).
    pub depth: usize,
    /// Interior lines that belong to no nested block.
    pub local_lines: usize,
    /// Nested blocks, in source order.
    pub children: Vec<BlockNode>,
}

/// Recursively extracts every nesting layer of a document.
///
/// # Errors
///
/// Propagates the first error from any layer's extraction.
pub fn build_block_tree(lines: Vec<LogicalLine>) -> Result<Vec<BlockNode>> {
    tracing::info!(lines = lines.len(), "building block tree");
    Ok(build_layer(lines, 0)?.1)
}

fn build_layer(lines: Vec<LogicalLine>, depth: usize) -> Result<(usize, Vec<BlockNode>)> {
    let extraction = extract_contexts(lines, depth)?;
    let local_lines = extraction.local().len();
    let mut nodes = Vec::with_capacity(extraction.blocks().len());

    for block in extraction.into_blocks() {
        let name = block.name()?;
        let line = block.header().and_then(LogicalLine::line_number);
        let tag = block.tag();
        let (local, children) = build_layer(block.into_interior(), depth + 1)?;
        nodes.push(BlockNode {
            tag,
            name,
            line,
            depth,
            local_lines: local,
            children,
        });
    }

    Ok((local_lines, nodes))
}
