// src/engine/traversal.rs

//! Flattening the process forest into the linear list the presentation layer
//! navigates.
//!
//! Trees are small (a handful of processes), so every query re-walks the
//! forest instead of maintaining a cached index.

use crate::process::ProcessNode;

/// A node as it appears in the flattened list.
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode<'a> {
    /// 0 for top-level nodes, +1 per enclosing group.
    pub depth: usize,
    pub node: &'a ProcessNode,
}

/// Flatten `roots` depth first. The children of a group are included only if
/// `expanded(group)` is true.
pub fn visible_nodes<'a>(
    roots: &'a [ProcessNode],
    expanded: &dyn Fn(&ProcessNode) -> bool,
) -> Vec<VisibleNode<'a>> {
    let mut out = Vec::new();
    push_visible(roots, 0, expanded, &mut out);
    out
}

fn push_visible<'a>(
    nodes: &'a [ProcessNode],
    depth: usize,
    expanded: &dyn Fn(&ProcessNode) -> bool,
    out: &mut Vec<VisibleNode<'a>>,
) {
    for node in nodes {
        out.push(VisibleNode { depth, node });
        if node.is_group() && expanded(node) {
            push_visible(node.children(), depth + 1, expanded, out);
        }
    }
}

/// The `n`-th node of the flattened list.
///
/// With `include_hidden` every group counts as expanded; otherwise only
/// focused groups do.
pub fn nth_visible(roots: &[ProcessNode], n: usize, include_hidden: bool) -> Option<&ProcessNode> {
    let mut remaining = n;
    find_nth(roots, &mut remaining, include_hidden)
}

fn find_nth<'a>(
    nodes: &'a [ProcessNode],
    remaining: &mut usize,
    include_hidden: bool,
) -> Option<&'a ProcessNode> {
    for node in nodes {
        if *remaining == 0 {
            return Some(node);
        }
        *remaining -= 1;

        if node.is_group() && (include_hidden || node.is_focused()) {
            if let Some(found) = find_nth(node.children(), remaining, include_hidden) {
                return Some(found);
            }
        }
    }
    None
}
