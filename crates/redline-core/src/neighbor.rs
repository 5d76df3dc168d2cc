//! Caret neighbor resolution.
//!
//! Backspace and Delete do not remove anything directly; they resolve the
//! visible character next to the caret and hand its range to
//! [`crate::wrap::wrap_as_deleted`]. Struck content (deletion spans and the
//! backend's `diff-del` markup) is skipped over, so repeated backspaces keep
//! eating visible text instead of re-striking what is already struck.

use crate::markup::{LeafKind, MarkupTree, Node, SpanClasses};
use crate::text_helpers::{word_extent_backward, word_extent_forward};
use crate::types::{Direction, Point, TreeRange};

/// One visible character and the boundary points around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleChar {
    pub start: Point,
    pub end: Point,
    pub ch: char,
}

/// Range of the single visible character next to the caret, or `None` at a
/// text boundary.
pub fn resolve_neighbor(
    tree: &MarkupTree,
    caret: &Point,
    direction: Direction,
    classes: &SpanClasses,
) -> Option<TreeRange> {
    let mut found = None;
    walk_visible(tree, caret, direction, classes, |vc| {
        found = Some(vc);
        false
    });
    let vc = found?;
    tracing::trace!(target: "redline::edit", ch = ?vc.ch, ?direction, "resolved neighbor");
    Some(TreeRange::new(vc.start, vc.end))
}

/// Range covering the word next to the caret, following the usual word-wise
/// deletion rules.
pub fn resolve_word(
    tree: &MarkupTree,
    caret: &Point,
    direction: Direction,
    classes: &SpanClasses,
) -> Option<TreeRange> {
    let mut chars = Vec::new();
    walk_visible(tree, caret, direction, classes, |vc| {
        // A line break ends the word walk; it is deleted on its own.
        let stop = vc.ch == '\n' && !chars.is_empty();
        if !stop {
            chars.push(vc);
        }
        !stop
    });
    let count = match direction {
        Direction::Backward => word_extent_backward(chars.iter().map(|vc| vc.ch)),
        Direction::Forward => word_extent_forward(chars.iter().map(|vc| vc.ch)),
    };
    // A lone newline is still one deletable character.
    let count = if count == 0 && !chars.is_empty() { 1 } else { count };
    let (first, last) = (chars.first()?, chars.get(count.checked_sub(1)?)?);
    Some(match direction {
        Direction::Backward => TreeRange::new(last.start.clone(), first.end.clone()),
        Direction::Forward => TreeRange::new(first.start.clone(), last.end.clone()),
    })
}

/// Range from the caret to the line boundary in `direction`.
///
/// Only visible characters count. `None` when the caret already sits at the
/// boundary, so a line break next to the caret is never consumed.
pub fn resolve_line(
    tree: &MarkupTree,
    caret: &Point,
    direction: Direction,
    classes: &SpanClasses,
) -> Option<TreeRange> {
    let mut chars = Vec::new();
    walk_visible(tree, caret, direction, classes, |vc| {
        if vc.ch == '\n' {
            return false;
        }
        chars.push(vc);
        true
    });
    let (first, last) = (chars.first()?, chars.last()?);
    Some(match direction {
        Direction::Backward => TreeRange::new(last.start.clone(), first.end.clone()),
        Direction::Forward => TreeRange::new(first.start.clone(), last.end.clone()),
    })
}

/// Split `range` into its runs of visible content.
///
/// Struck leaves inside the range separate runs, so wrapping each run on its
/// own leaves existing deletion spans and backend strikes where they are.
pub fn visible_runs(tree: &MarkupTree, range: &TreeRange, classes: &SpanClasses) -> Vec<TreeRange> {
    let mut runs = Vec::new();
    let mut current: Option<TreeRange> = None;
    for leaf in tree.leaves(classes) {
        if leaf.is_empty() {
            continue;
        }
        let (start, end) = (leaf.point_before(0), leaf.point_before(leaf.len()));
        if end <= range.start || start >= range.end {
            continue;
        }
        if leaf.struck {
            runs.extend(current.take());
            continue;
        }
        let start = start.max(range.start.clone());
        let end = end.min(range.end.clone());
        match &mut current {
            Some(run) => run.end = end,
            None => current = Some(TreeRange::new(start, end)),
        }
    }
    runs.extend(current);
    runs
}

/// Walk visible characters outward from the caret, nearest first, until
/// `visit` returns false.
pub fn walk_visible(
    tree: &MarkupTree,
    caret: &Point,
    direction: Direction,
    classes: &SpanClasses,
    mut visit: impl FnMut(VisibleChar) -> bool,
) {
    let mut leaves = tree.leaves(classes);
    leaves.retain(|leaf| !leaf.struck && !leaf.is_empty());
    if direction == Direction::Backward {
        leaves.reverse();
    }

    for leaf in leaves {
        match leaf.kind {
            LeafKind::LineBreak => {
                let (start, end) = (leaf.point_before(0), leaf.point_before(1));
                let reachable = match direction {
                    Direction::Backward => end <= *caret,
                    Direction::Forward => start >= *caret,
                };
                if reachable && !visit(VisibleChar { start, end, ch: '\n' }) {
                    return;
                }
            }
            LeafKind::Text(len) => {
                let Some(Node::Text(text)) = tree.node(&leaf.path) else {
                    continue;
                };
                let chars: Vec<char> = text.chars().collect();
                let indices: Vec<usize> = match direction {
                    Direction::Backward => {
                        let limit = if leaf.path == caret.path {
                            caret.offset.min(len)
                        } else if leaf.point_before(len) <= *caret {
                            len
                        } else {
                            0
                        };
                        (0..limit).rev().collect()
                    }
                    Direction::Forward => {
                        let from = if leaf.path == caret.path {
                            caret.offset.min(len)
                        } else if leaf.point_before(0) >= *caret {
                            0
                        } else {
                            len
                        };
                        (from..len).collect()
                    }
                };
                for i in indices {
                    let vc = VisibleChar {
                        start: leaf.point_before(i),
                        end: leaf.point_before(i + 1),
                        ch: chars[i],
                    };
                    if !visit(vc) {
                        return;
                    }
                }
            }
        }
    }
}
