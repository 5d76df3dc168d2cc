//! Core editor types: boundary points, ranges, selection and edit outcomes.
//!
//! These types are framework-agnostic. The browser layer converts DOM
//! `(node, offset)` pairs into [`Point`]s by walking child indices up to the
//! editable container.

use std::cmp::Ordering;

use crate::markup::{MarkupTree, compare_points};

/// A DOM-style boundary point.
///
/// `path` indexes children from the container root down to the container
/// node. When that node is text, `offset` is a char offset into it; when it
/// is an element (or the root), `offset` is a child index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Point in the root container.
    pub fn root(offset: usize) -> Self {
        Self {
            path: Vec::new(),
            offset,
        }
    }

    /// Point immediately after the node at `path`.
    pub fn after_node(path: &[usize]) -> Self {
        match path.split_last() {
            Some((last, parent)) => Self::new(parent.to_vec(), last + 1),
            None => Self::root(0),
        }
    }

    /// Keep this point valid after child `idx` of `parent` was removed.
    pub fn adjust_for_removal(&mut self, parent: &[usize], idx: usize) {
        if self.path.len() > parent.len() && self.path.starts_with(parent) {
            let child = self.path[parent.len()];
            match child.cmp(&idx) {
                Ordering::Equal => {
                    self.path.truncate(parent.len());
                    self.offset = idx;
                }
                Ordering::Greater => self.path[parent.len()] -= 1,
                Ordering::Less => {}
            }
        } else if self.path == parent && self.offset > idx {
            self.offset -= 1;
        }
    }

    /// Keep this point valid after a node was inserted as child `idx` of
    /// `parent`.
    pub fn adjust_for_insertion(&mut self, parent: &[usize], idx: usize) {
        if self.path.len() > parent.len() && self.path.starts_with(parent) {
            if self.path[parent.len()] >= idx {
                self.path[parent.len()] += 1;
            }
        } else if self.path == parent && self.offset > idx {
            self.offset += 1;
        }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_points(self, other)
    }
}

/// An ordered pair of boundary points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeRange {
    pub start: Point,
    pub end: Point,
}

impl TreeRange {
    /// Create a range, swapping the ends if they are out of order.
    pub fn new(a: Point, b: Point) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn caret(point: Point) -> Self {
        Self {
            start: point.clone(),
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Nearest element containing both ends: the "common ancestor container"
    /// climbed to an element.
    pub fn common_element_path(&self, tree: &MarkupTree) -> Vec<usize> {
        let common: Vec<usize> = self
            .start
            .path
            .iter()
            .zip(&self.end.path)
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| *a)
            .collect();
        tree.nearest_element_path(&common)
    }
}

/// Selection with anchor and head points.
///
/// The anchor is where the selection started, the head is where the caret is
/// now. They may be in any order - use [`Selection::to_range`] for ordered
/// bounds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Point,
    pub head: Point,
}

impl Selection {
    pub fn new(anchor: Point, head: Point) -> Self {
        Self { anchor, head }
    }

    /// Collapsed selection (caret).
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            head: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }

    pub fn to_range(&self) -> TreeRange {
        TreeRange::new(self.anchor.clone(), self.head.clone())
    }
}

/// Result of an interactive editing operation.
///
/// None of these are errors: boundary keystrokes and edits outside edit mode
/// are routine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// The markup changed.
    Applied,
    /// Nothing to do (boundary backspace, empty range, empty history).
    NoOp,
    /// The editor is not in edit mode.
    Ignored,
}

impl EditOutcome {
    pub fn is_applied(self) -> bool {
        self == EditOutcome::Applied
    }
}

/// Direction of a caret-relative deletion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Backspace.
    Backward,
    /// Delete.
    Forward,
}
