//! Markup tree for the editable container.
//!
//! The container's content is held as a small DOM-like tree of text nodes and
//! elements. Positions inside it are DOM boundary points (see [`Point`]), so
//! the browser layer can map a live `Selection` onto the tree by walking child
//! indices, and the editing algorithms can reason about the same structure the
//! user sees.
//!
//! Offsets inside text nodes are Unicode scalar values (chars), not bytes or
//! UTF-16 code units.

use std::cmp::Ordering;

use smol_str::SmolStr;

use crate::html;
use crate::types::Point;

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    /// Create a text node.
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text_content(&mut out);
        out
    }

    fn push_text_content(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            Node::Element(el) => {
                for child in &el.children {
                    child.push_text_content(out);
                }
            }
        }
    }

    /// Length of this node as a boundary-point container: chars for text,
    /// child count for elements.
    pub fn boundary_len(&self) -> usize {
        match self {
            Node::Text(s) => s.chars().count(),
            Node::Element(el) => el.children.len(),
        }
    }
}

/// An element with a tag, attributes in source order, and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: SmolStr,
    pub attrs: Vec<(SmolStr, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A `<span class="...">` wrapper, the shape used for tracked changes.
    pub fn span_with_class(class: &str) -> Self {
        let mut el = Self::new("span");
        el.attrs.push((SmolStr::new_static("class"), class.to_string()));
        el
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Elements that never have children.
    pub fn is_void(&self) -> bool {
        html::is_void_tag(&self.tag)
    }

    /// Copy of tag and attributes with no children (`cloneNode(false)`).
    pub fn shallow_clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            children: Vec::new(),
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_text_content(&mut out);
        }
        out
    }
}

/// What an element means to the track-changes engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    /// Text typed during this session.
    Addition,
    /// Content struck through by the user during this session.
    Deletion,
    /// Struck-through markup already present in the seed (backend diff).
    Struck,
    /// `<br>`, one newline character.
    LineBreak,
    /// Anything else, passed through as ordinary content.
    Other,
}

impl MarkupKind {
    /// Content that is already gone from the accepted text.
    pub fn is_struck(self) -> bool {
        matches!(self, MarkupKind::Deletion | MarkupKind::Struck)
    }
}

/// Class names identifying the editor's own spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanClasses {
    pub addition: SmolStr,
    pub deletion: SmolStr,
}

/// Class the backend puts on its inline-diff deletions.
pub const DIFF_DELETION_CLASS: &str = "diff-del";

impl Default for SpanClasses {
    fn default() -> Self {
        Self {
            addition: SmolStr::new_static("tc-ins"),
            deletion: SmolStr::new_static("tc-del"),
        }
    }
}

impl SpanClasses {
    pub fn new(addition: impl Into<SmolStr>, deletion: impl Into<SmolStr>) -> Self {
        Self {
            addition: addition.into(),
            deletion: deletion.into(),
        }
    }

    pub fn classify(&self, el: &Element) -> MarkupKind {
        if el.has_class(&self.addition) {
            return MarkupKind::Addition;
        }
        if el.has_class(&self.deletion) {
            return MarkupKind::Deletion;
        }
        if el.has_class(DIFF_DELETION_CLASS) {
            return MarkupKind::Struck;
        }
        match el.tag.to_ascii_lowercase().as_str() {
            "del" | "s" | "strike" => MarkupKind::Struck,
            "br" => MarkupKind::LineBreak,
            _ => MarkupKind::Other,
        }
    }

    pub fn classify_node(&self, node: &Node) -> Option<MarkupKind> {
        node.as_element().map(|el| self.classify(el))
    }

    pub fn addition_span(&self) -> Element {
        Element::span_with_class(&self.addition)
    }

    pub fn deletion_span(&self) -> Element {
        Element::span_with_class(&self.deletion)
    }
}

/// A leaf of visible document order: a text node or a line break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub path: Vec<usize>,
    pub kind: LeafKind,
    /// Inside a deletion span or pre-existing struck markup.
    pub struck: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Text node with this many chars.
    Text(usize),
    LineBreak,
}

impl Leaf {
    /// Number of characters the leaf contributes to text offsets.
    pub fn len(&self) -> usize {
        match self.kind {
            LeafKind::Text(n) => n,
            LeafKind::LineBreak => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boundary point before character `i` of this leaf.
    pub fn point_before(&self, i: usize) -> Point {
        match self.kind {
            LeafKind::Text(_) => Point::new(self.path.clone(), i),
            LeafKind::LineBreak => {
                let (parent, idx) = split_path(&self.path);
                Point::new(parent.to_vec(), idx + i)
            }
        }
    }
}

/// Split a non-empty path into its parent path and last index.
///
/// The root path splits into itself and index 0.
pub fn split_path(path: &[usize]) -> (&[usize], usize) {
    match path.split_last() {
        Some((last, parent)) => (parent, *last),
        None => (path, 0),
    }
}

/// The container's content: a root element whose children are the editable
/// markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupTree {
    root: Element,
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self {
            root: Element::new("div"),
        }
    }
}

impl MarkupTree {
    /// Parse markup leniently. Never fails; see [`html::parse_markup`].
    pub fn parse(markup: &str) -> Self {
        Self {
            root: Element::new("div").with_children(html::parse_markup(markup)),
        }
    }

    /// Serialize the root's children back to markup.
    pub fn to_markup(&self) -> String {
        html::serialize_nodes(&self.root.children)
    }

    pub fn children(&self) -> &[Node] {
        &self.root.children
    }

    /// Node at `path`. The empty path is not a node.
    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.children.get(*first)?;
        for idx in rest {
            node = node.as_element()?.children.get(*idx)?;
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.children.get_mut(*first)?;
        for idx in rest {
            node = node.as_element_mut()?.children.get_mut(*idx)?;
        }
        Some(node)
    }

    /// Element at `path`, the root for the empty path.
    pub fn element(&self, path: &[usize]) -> Option<&Element> {
        if path.is_empty() {
            return Some(&self.root);
        }
        self.node(path)?.as_element()
    }

    pub fn element_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        if path.is_empty() {
            return Some(&mut self.root);
        }
        self.node_mut(path)?.as_element_mut()
    }

    /// Boundary length of the container at `path` (root included).
    pub fn boundary_len(&self, path: &[usize]) -> Option<usize> {
        if path.is_empty() {
            return Some(self.root.children.len());
        }
        self.node(path).map(Node::boundary_len)
    }

    /// Whether `point` names an existing container with an in-bounds offset.
    pub fn is_valid_point(&self, point: &Point) -> bool {
        self.boundary_len(&point.path)
            .map(|len| point.offset <= len)
            .unwrap_or(false)
    }

    /// Point at the very end of the content.
    pub fn end_point(&self) -> Point {
        Point::new(Vec::new(), self.root.children.len())
    }

    /// Path of the nearest element containing `path` (itself included when it
    /// is an element), or the root's empty path.
    pub fn nearest_element_path(&self, path: &[usize]) -> Vec<usize> {
        let mut p = path.to_vec();
        while !p.is_empty() {
            if matches!(self.node(&p), Some(Node::Element(_))) {
                return p;
            }
            p.pop();
        }
        p
    }

    /// Outermost ancestor of `path` (itself included) whose kind matches.
    pub fn outermost_ancestor(
        &self,
        path: &[usize],
        classes: &SpanClasses,
        matches: impl Fn(MarkupKind) -> bool,
    ) -> Option<Vec<usize>> {
        (1..=path.len())
            .map(|n| &path[..n])
            .find(|prefix| {
                self.node(prefix)
                    .and_then(|n| classes.classify_node(n))
                    .map(&matches)
                    .unwrap_or(false)
            })
            .map(<[usize]>::to_vec)
    }

    /// Visible-order leaves: text nodes and line breaks, with struck flags.
    pub fn leaves(&self, classes: &SpanClasses) -> Vec<Leaf> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_leaves(&self.root.children, classes, false, &mut path, &mut out);
        out
    }

    /// Characters before `point`, counting all text (struck included) and one
    /// per line break.
    pub fn text_offset_of(&self, point: &Point, classes: &SpanClasses) -> usize {
        let mut acc = 0;
        for leaf in self.leaves(classes) {
            if leaf.path == point.path {
                return acc + point.offset.min(leaf.len());
            }
            let end = leaf.point_before(leaf.len());
            if compare_points(&end, point) != Ordering::Greater {
                acc += leaf.len();
            } else {
                break;
            }
        }
        acc
    }

    /// Inverse of [`Self::text_offset_of`].
    ///
    /// At a boundary between two leaves the earlier visible leaf wins, so a
    /// caret restored at the end of typed text stays inside its addition span.
    pub fn point_at_text_offset(&self, offset: usize, classes: &SpanClasses) -> Point {
        let mut acc = 0;
        for leaf in self.leaves(classes) {
            let len = leaf.len();
            let inside = offset < acc + len || (offset == acc + len && !leaf.struck);
            if inside {
                return match leaf.kind {
                    LeafKind::Text(_) => Point::new(leaf.path.clone(), offset - acc),
                    LeafKind::LineBreak => leaf.point_before(offset - acc),
                };
            }
            acc += len;
        }
        self.end_point()
    }

    /// Remove the node at `path`, keeping `points` valid.
    ///
    /// Points inside the removed node collapse to where it stood.
    pub fn remove_node(&mut self, path: &[usize], points: &mut [&mut Point]) -> Option<Node> {
        let (parent, idx) = split_path(path);
        let parent_el = self.element_mut(parent)?;
        if idx >= parent_el.children.len() {
            return None;
        }
        let removed = parent_el.children.remove(idx);
        for point in points.iter_mut() {
            point.adjust_for_removal(parent, idx);
        }
        Some(removed)
    }

    /// Remove every addition span whose text has become empty.
    pub fn prune_empty_additions(&mut self, classes: &SpanClasses, points: &mut [&mut Point]) {
        while let Some(path) = self.find_empty_addition(classes) {
            self.remove_node(&path, points);
        }
    }

    fn find_empty_addition(&self, classes: &SpanClasses) -> Option<Vec<usize>> {
        fn walk(
            nodes: &[Node],
            classes: &SpanClasses,
            path: &mut Vec<usize>,
        ) -> Option<Vec<usize>> {
            for (i, node) in nodes.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };
                path.push(i);
                if classes.classify(el) == MarkupKind::Addition && el.text_content().is_empty() {
                    return Some(path.clone());
                }
                if let Some(found) = walk(&el.children, classes, path) {
                    return Some(found);
                }
                path.pop();
            }
            None
        }
        walk(&self.root.children, classes, &mut Vec::new())
    }

    /// Count of addition and deletion spans.
    pub fn stats(&self, classes: &SpanClasses) -> ChangeStats {
        fn walk(nodes: &[Node], classes: &SpanClasses, stats: &mut ChangeStats) {
            for node in nodes {
                if let Node::Element(el) = node {
                    match classes.classify(el) {
                        MarkupKind::Addition => stats.additions += 1,
                        MarkupKind::Deletion => stats.deletions += 1,
                        _ => {}
                    }
                    walk(&el.children, classes, stats);
                }
            }
        }
        let mut stats = ChangeStats::default();
        walk(&self.root.children, classes, &mut stats);
        stats
    }
}

/// Number of tracked-change spans in a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ChangeStats {
    pub additions: usize,
    pub deletions: usize,
}

fn collect_leaves(
    nodes: &[Node],
    classes: &SpanClasses,
    struck: bool,
    path: &mut Vec<usize>,
    out: &mut Vec<Leaf>,
) {
    for (i, node) in nodes.iter().enumerate() {
        path.push(i);
        match node {
            Node::Text(s) => out.push(Leaf {
                path: path.clone(),
                kind: LeafKind::Text(s.chars().count()),
                struck,
            }),
            Node::Element(el) => match classes.classify(el) {
                MarkupKind::LineBreak => out.push(Leaf {
                    path: path.clone(),
                    kind: LeafKind::LineBreak,
                    struck,
                }),
                kind => collect_leaves(
                    &el.children,
                    classes,
                    struck || kind.is_struck(),
                    path,
                    out,
                ),
            },
        }
        path.pop();
    }
}

/// Document-order comparison of two boundary points.
///
/// Compares `path ++ [offset]` lexicographically, which orders a point before
/// child `k` ahead of every point inside child `k`.
pub fn compare_points(a: &Point, b: &Point) -> Ordering {
    a.path
        .iter()
        .chain(std::iter::once(&a.offset))
        .cmp(b.path.iter().chain(std::iter::once(&b.offset)))
}

/// Byte index of char `n` in `s`, clamped to the end.
pub(crate) fn char_to_byte(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(b, _)| b).unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> SpanClasses {
        SpanClasses::default()
    }

    #[test]
    fn test_classify() {
        let c = classes();
        assert_eq!(c.classify(&c.addition_span()), MarkupKind::Addition);
        assert_eq!(c.classify(&c.deletion_span()), MarkupKind::Deletion);
        assert_eq!(
            c.classify(&Element::span_with_class("diff-del")),
            MarkupKind::Struck
        );
        assert_eq!(c.classify(&Element::new("DEL")), MarkupKind::Struck);
        assert_eq!(c.classify(&Element::new("br")), MarkupKind::LineBreak);
        assert_eq!(
            c.classify(&Element::span_with_class("diff-ins")),
            MarkupKind::Other
        );
    }

    #[test]
    fn test_compare_points() {
        // Before child 2 of the root.
        let before_child = Point::new(vec![], 2);
        assert_eq!(
            compare_points(&Point::new(vec![1], 3), &before_child),
            Ordering::Less
        );
        assert_eq!(
            compare_points(&Point::new(vec![2, 0], 0), &before_child),
            Ordering::Greater
        );
        assert_eq!(
            compare_points(&Point::new(vec![1], 1), &Point::new(vec![1], 4)),
            Ordering::Less
        );
    }

    #[test]
    fn test_leaves_mark_struck_content() {
        let tree = MarkupTree::parse(
            "ab<span class=\"tc-del\">cd</span><br><del class=\"diff-del\">e</del>f",
        );
        let leaves = tree.leaves(&classes());
        let shape: Vec<_> = leaves.iter().map(|l| (l.len(), l.struck)).collect();
        assert_eq!(
            shape,
            vec![(2, false), (2, true), (1, false), (1, true), (1, false)]
        );
    }

    #[test]
    fn test_text_offset_round_trip() {
        let c = classes();
        let tree = MarkupTree::parse("ab<span class=\"tc-ins\">xy</span>cd");
        let point = Point::new(vec![1, 0], 2);
        assert_eq!(tree.text_offset_of(&point, &c), 4);
        assert_eq!(tree.point_at_text_offset(4, &c), point);
        assert_eq!(tree.point_at_text_offset(5, &c), Point::new(vec![2], 1));
        assert_eq!(tree.point_at_text_offset(99, &c), tree.end_point());
    }

    #[test]
    fn test_text_offset_skips_struck_boundary() {
        let c = classes();
        let tree = MarkupTree::parse("ab<span class=\"tc-del\">cd</span>ef");
        // Offset 4 sits at the end of the struck "cd"; the caret lands in "ef".
        assert_eq!(tree.point_at_text_offset(4, &c), Point::new(vec![2], 0));
    }

    #[test]
    fn test_remove_node_adjusts_points() {
        let mut tree = MarkupTree::parse("a<b>x</b>c");
        let mut after = Point::new(vec![2], 1);
        let mut inside = Point::new(vec![1, 0], 1);
        let mut element_point = Point::new(vec![], 3);
        tree.remove_node(&[1], &mut [&mut after, &mut inside, &mut element_point]);
        assert_eq!(tree.to_markup(), "ac");
        assert_eq!(after, Point::new(vec![1], 1));
        assert_eq!(inside, Point::new(vec![], 1));
        assert_eq!(element_point, Point::new(vec![], 2));
    }

    #[test]
    fn test_prune_empty_additions() {
        let c = classes();
        let mut tree = MarkupTree::parse("a<span class=\"tc-ins\"></span>b");
        let mut caret = Point::new(vec![2], 0);
        tree.prune_empty_additions(&c, &mut [&mut caret]);
        assert_eq!(tree.to_markup(), "ab");
        assert_eq!(caret, Point::new(vec![1], 0));
    }

    #[test]
    fn test_stats() {
        let tree = MarkupTree::parse(
            "<span class=\"tc-del\">30</span><span class=\"tc-ins\">45</span><span class=\"tc-ins\">!</span>",
        );
        assert_eq!(
            tree.stats(&classes()),
            ChangeStats {
                additions: 2,
                deletions: 1
            }
        );
    }
}
