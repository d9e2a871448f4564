//! Formatted output helpers for CLI commands.

use std::fmt::Write as _;

use therion_syntax::context::BlockNode;

/// Formats a count with a singular or plural noun (e.g., "1 block", "3 blocks").
#[must_use]
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Total number of blocks in a tree, nested ones included.
#[must_use]
pub fn count_blocks(nodes: &[BlockNode]) -> usize {
    nodes.iter().map(|n| 1 + count_blocks(&n.children)).sum()
}

/// Renders a block tree as indented text, one block per line.
#[must_use]
pub fn format_block_tree(nodes: &[BlockNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &BlockNode) {
    let indent = "  ".repeat(node.depth);
    let _ = write!(out, "{indent}{}", node.tag);
    if let Some(name) = &node.name {
        let _ = write!(out, " {name}");
    }
    if let Some(line) = node.line {
        let _ = write!(out, " (line {line})");
    }
    if node.local_lines > 0 {
        let _ = write!(out, " [{}]", plural(node.local_lines, "line"));
    }
    out.push('\n');
    for child in &node.children {
        write_node(out, child);
    }
}

#[cfg(test)]
mod tests {
    use therion_syntax::context::build_block_tree;
    use therion_syntax::parser::parse_text;

    use super::*;

    fn tree(src: &str) -> Vec<BlockNode> {
        build_block_tree(parse_text(src).expect("parse")).expect("tree")
    }

    #[test]
    fn plural_picks_suffix() {
        assert_eq!(plural(0, "block"), "0 blocks");
        assert_eq!(plural(1, "block"), "1 block");
        assert_eq!(plural(2, "station"), "2 stations");
    }

    #[test]
    fn count_includes_nested_blocks() {
        let nodes = tree("survey a\n centreline\n endcentreline\nendsurvey\nmap m\nendmap\n");
        assert_eq!(count_blocks(&nodes), 3);
    }

    #[test]
    fn tree_renders_indented() {
        let nodes = tree("survey a\n  title x\n  scrap s1\n  endscrap\nendsurvey\n");
        assert_eq!(
            format_block_tree(&nodes),
            "survey a (line 1) [1 line]\n  scrap s1 (line 3)\n"
        );
    }
}
