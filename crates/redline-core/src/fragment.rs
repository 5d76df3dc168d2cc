//! DOM `Range` primitives over the markup tree.
//!
//! `extract_contents` and `insert_node` follow the DOM semantics the
//! contenteditable surface exhibits: partially selected elements are split,
//! with a shallow clone carrying the selected part into the fragment.

use crate::markup::{MarkupTree, Node, char_to_byte, split_path};
use crate::types::{Point, TreeRange};

/// One side of a range, relative to the node currently being split.
#[derive(Clone, Copy)]
enum Edge<'a> {
    /// Unbounded on this side.
    Open,
    /// Relative path and offset of the boundary point.
    At(&'a [usize], usize),
}

/// Remove the range's contents from the tree and return them as a fragment.
///
/// After extraction `range.start` is still a valid point, and it is where the
/// removed content used to begin.
pub fn extract_contents(tree: &mut MarkupTree, range: &TreeRange) -> Vec<Node> {
    if range.is_collapsed() || !tree.is_valid_point(&range.start) || !tree.is_valid_point(&range.end)
    {
        return Vec::new();
    }
    let Some(root) = tree.element_mut(&[]) else {
        return Vec::new();
    };
    extract_children(
        &mut root.children,
        Edge::At(&range.start.path, range.start.offset),
        Edge::At(&range.end.path, range.end.offset),
    )
}

/// Split the children between `start` and `end`.
fn extract_children(children: &mut Vec<Node>, start: Edge<'_>, end: Edge<'_>) -> Vec<Node> {
    let (s_idx, s_inner) = match start {
        Edge::Open => (0, None),
        Edge::At([], offset) => (offset.min(children.len()), None),
        Edge::At([k, rest @ ..], offset) => (*k, Some(Edge::At(rest, offset))),
    };
    let (e_idx, e_inner) = match end {
        Edge::Open => (children.len(), None),
        Edge::At([], offset) => (offset.min(children.len()), None),
        Edge::At([k, rest @ ..], offset) => (*k, Some(Edge::At(rest, offset))),
    };

    if s_idx > e_idx || s_idx > children.len() {
        return Vec::new();
    }

    // Both ends inside the same child.
    if let (Some(s), Some(e)) = (s_inner, e_inner) {
        if s_idx == e_idx {
            return children
                .get_mut(s_idx)
                .and_then(|child| extract_from_node(child, s, e))
                .into_iter()
                .collect();
        }
    }

    let mut out = Vec::new();
    let mut first_full = s_idx;
    if let Some(s) = s_inner {
        if let Some(piece) = children
            .get_mut(s_idx)
            .and_then(|child| extract_from_node(child, s, Edge::Open))
        {
            out.push(piece);
        }
        first_full = s_idx + 1;
    }

    let end_piece = match e_inner {
        Some(e) => children
            .get_mut(e_idx)
            .and_then(|child| extract_from_node(child, Edge::Open, e)),
        None => None,
    };

    let last_full = e_idx.min(children.len());
    if first_full < last_full {
        out.extend(children.drain(first_full..last_full));
    }
    out.extend(end_piece);
    out
}

/// Extract the part of a partially selected node. Text is cut out of the
/// original; elements are split into the original and a shallow clone.
fn extract_from_node(node: &mut Node, start: Edge<'_>, end: Edge<'_>) -> Option<Node> {
    match node {
        Node::Text(text) => {
            let len = text.chars().count();
            let from = match start {
                Edge::At(_, offset) => offset.min(len),
                Edge::Open => 0,
            };
            let to = match end {
                Edge::At(_, offset) => offset.min(len),
                Edge::Open => len,
            };
            if from >= to {
                return None;
            }
            let (a, b) = (char_to_byte(text, from), char_to_byte(text, to));
            let piece: String = text[a..b].to_string();
            text.replace_range(a..b, "");
            Some(Node::Text(piece))
        }
        Node::Element(el) => {
            let mut shell = el.shallow_clone();
            shell.children = extract_children(&mut el.children, start, end);
            Some(Node::Element(shell))
        }
    }
}

/// Insert `node` at `point` (`Range.insertNode`), splitting a text container.
///
/// Returns the inserted node's path; `caret`-style points passed in are kept
/// valid.
pub fn insert_node(
    tree: &mut MarkupTree,
    point: &Point,
    node: Node,
    points: &mut [&mut Point],
) -> Option<Vec<usize>> {
    let in_text = matches!(tree.node(&point.path), Some(Node::Text(_)));
    if !in_text {
        if tree.element(&point.path).is_none() {
            return None;
        }
        return insert_child(tree, &point.path, point.offset, node, points);
    }

    let (parent, idx) = split_path(&point.path);
    let parent = parent.to_vec();
    let split_at = point.offset;
    let Some(Node::Text(text)) = tree.node_mut(&point.path) else {
        return None;
    };
    let len = text.chars().count();

    if split_at == 0 {
        return insert_child(tree, &parent, idx, node, points);
    }
    if split_at >= len {
        return insert_child(tree, &parent, idx + 1, node, points);
    }

    let byte = char_to_byte(text, split_at);
    let tail = text.split_off(byte);
    let new_path = insert_child(tree, &parent, idx + 1, node, &mut [])?;
    insert_child(tree, &parent, idx + 2, Node::Text(tail), &mut [])?;
    for p in points.iter_mut() {
        if p.path == point.path && p.offset > split_at {
            // Past the split: now in the tail node.
            p.path[parent.len()] = idx + 2;
            p.offset -= split_at;
        } else if p.path.len() > parent.len()
            && p.path.starts_with(&parent)
            && p.path[parent.len()] > idx
        {
            p.path[parent.len()] += 2;
        } else if p.path == parent && p.offset > idx {
            p.offset += 2;
        }
    }
    Some(new_path)
}

fn insert_child(
    tree: &mut MarkupTree,
    parent: &[usize],
    idx: usize,
    node: Node,
    points: &mut [&mut Point],
) -> Option<Vec<usize>> {
    let el = tree.element_mut(parent)?;
    let idx = idx.min(el.children.len());
    el.children.insert(idx, node);
    for p in points.iter_mut() {
        p.adjust_for_insertion(parent, idx);
    }
    let mut path = parent.to_vec();
    path.push(idx);
    Some(path)
}
