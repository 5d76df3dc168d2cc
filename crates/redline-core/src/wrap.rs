//! Range-to-span conversion: marking content as deleted.

use crate::fragment::{extract_contents, insert_node};
use crate::markup::{MarkupKind, MarkupTree, Node, SpanClasses};
use crate::types::{Point, TreeRange};

/// Mark the range's content as deleted and return the new caret.
///
/// Content typed during this session is retracted outright instead of being
/// struck through. Everything else is moved into a new deletion span at the
/// range's position, and the caret lands right after that span. Returns
/// `None` when there was nothing to wrap.
pub fn wrap_as_deleted(
    tree: &mut MarkupTree,
    range: &TreeRange,
    classes: &SpanClasses,
) -> Option<Point> {
    wrap_as_deleted_keeping(tree, range, classes, &mut [])
}

/// [`wrap_as_deleted`], keeping `keep` valid. Points in `keep` must lie
/// before `range.start`.
pub fn wrap_as_deleted_keeping(
    tree: &mut MarkupTree,
    range: &TreeRange,
    classes: &SpanClasses,
    keep: &mut [&mut Point],
) -> Option<Point> {
    if range.is_collapsed() {
        return None;
    }

    let common = range.common_element_path(tree);
    let in_addition = !common.is_empty()
        && tree
            .element(&common)
            .map(|el| classes.classify(el) == MarkupKind::Addition)
            .unwrap_or(false);

    if in_addition {
        let removed = extract_contents(tree, range);
        if removed.is_empty() {
            return None;
        }
        let mut caret = range.start.clone();
        tree.prune_empty_additions(classes, &mut tracked(keep, &mut caret));
        tracing::trace!(target: "redline::edit", ?caret, "retracted unconfirmed addition");
        return Some(caret);
    }

    let mut fragment = extract_contents(tree, range);
    if fragment.is_empty() {
        return None;
    }
    strip_tracked_spans(&mut fragment, classes);

    // The new span must not nest inside another tracked or struck span.
    let mut insert_at = range.start.clone();
    let hoist_from = tree.outermost_ancestor(&insert_at.path, classes, |kind| {
        matches!(
            kind,
            MarkupKind::Addition | MarkupKind::Deletion | MarkupKind::Struck
        )
    });
    if let Some(span) = hoist_from {
        insert_at = Point::after_node(&span);
    }
    tree.prune_empty_additions(classes, &mut tracked(keep, &mut insert_at));

    if fragment.is_empty() {
        // Only unconfirmed additions were selected, and they are gone now.
        tracing::trace!(target: "redline::edit", "selection held only additions");
        return Some(insert_at);
    }

    let span = Node::Element(classes.deletion_span().with_children(fragment));
    let path = insert_node(tree, &insert_at, span, keep)?;
    tracing::trace!(target: "redline::edit", ?path, "wrapped range in deletion span");
    Some(Point::after_node(&path))
}

/// Normalize an extracted fragment before it goes into a deletion span.
///
/// Addition spans are dropped (their text was never accepted). Existing
/// deletion spans and backend struck markup stay intact inside the new span.
/// Empty text and empty split-off element shells are discarded.
fn strip_tracked_spans(nodes: &mut Vec<Node>, classes: &SpanClasses) {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        match node {
            Node::Text(s) if s.is_empty() => {}
            Node::Text(s) => push_text(&mut out, s),
            Node::Element(el) if classes.classify(&el) == MarkupKind::Addition => {}
            Node::Element(mut el) => {
                strip_tracked_spans(&mut el.children, classes);
                if !el.children.is_empty() || el.is_void() {
                    out.push(Node::Element(el));
                }
            }
        }
    }
    *nodes = out;
}

fn tracked<'a>(keep: &'a mut [&mut Point], point: &'a mut Point) -> Vec<&'a mut Point> {
    let mut points: Vec<&'a mut Point> = keep.iter_mut().map(|p| &mut **p).collect();
    points.push(point);
    points
}

fn push_text(out: &mut Vec<Node>, text: String) {
    if let Some(Node::Text(prev)) = out.last_mut() {
        prev.push_str(&text);
    } else {
        out.push(Node::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(markup: &str, start: Point, end: Point) -> (String, Option<Point>) {
        let mut tree = MarkupTree::parse(markup);
        let caret = wrap_as_deleted(&mut tree, &TreeRange::new(start, end), &SpanClasses::default());
        (tree.to_markup(), caret)
    }

    #[test]
    fn test_wrap_plain_text() {
        let (markup, caret) = wrap(
            "Payment is due within 30 days.",
            Point::new(vec![0], 22),
            Point::new(vec![0], 24),
        );
        assert_eq!(
            markup,
            "Payment is due within <span class=\"tc-del\">30</span> days."
        );
        assert_eq!(caret, Some(Point::root(2)));
    }

    #[test]
    fn test_wrap_inside_addition_retracts() {
        let (markup, caret) = wrap(
            "a<span class=\"tc-ins\">hello</span>b",
            Point::new(vec![1, 0], 0),
            Point::new(vec![1, 0], 5),
        );
        assert_eq!(markup, "ab");
        assert_eq!(caret, Some(Point::root(1)));
    }

    #[test]
    fn test_wrap_partial_addition_keeps_rest() {
        let (markup, caret) = wrap(
            "<span class=\"tc-ins\">hello</span>",
            Point::new(vec![0, 0], 4),
            Point::new(vec![0, 0], 5),
        );
        assert_eq!(markup, "<span class=\"tc-ins\">hell</span>");
        assert_eq!(caret, Some(Point::new(vec![0, 0], 4)));
    }

    #[test]
    fn test_wrap_spanning_addition_and_text() {
        // "xy" was typed, "cd" is original: only "cd" is struck.
        let (markup, caret) = wrap(
            "ab<span class=\"tc-ins\">xy</span>cd",
            Point::new(vec![1, 0], 0),
            Point::new(vec![2], 2),
        );
        assert_eq!(markup, "ab<span class=\"tc-del\">cd</span>");
        assert_eq!(caret, Some(Point::root(2)));
    }

    #[test]
    fn test_wrap_over_existing_deletion_keeps_it() {
        let (markup, _) = wrap(
            "a<span class=\"tc-del\">b</span>c",
            Point::new(vec![0], 0),
            Point::new(vec![2], 1),
        );
        assert_eq!(
            markup,
            "<span class=\"tc-del\">a<span class=\"tc-del\">b</span>c</span>"
        );
    }

    #[test]
    fn test_wrap_keeps_backend_strike() {
        let (markup, _) = wrap(
            "a <del class=\"diff-del\">old</del><ins class=\"diff-ins\">new</ins> b",
            Point::root(0),
            Point::root(4),
        );
        assert_eq!(
            markup,
            "<span class=\"tc-del\">a <del class=\"diff-del\">old</del><ins class=\"diff-ins\">new</ins> b</span>"
        );
        assert_eq!(
            crate::extract::final_text_from_markup(&markup, &SpanClasses::default()),
            ""
        );
    }

    #[test]
    fn test_wrap_keeping_earlier_points() {
        let mut tree = MarkupTree::parse("<span class=\"tc-ins\"></span>ab cd");
        let mut earlier = Point::new(vec![1], 1);
        let caret = wrap_as_deleted_keeping(
            &mut tree,
            &TreeRange::new(Point::new(vec![1], 3), Point::new(vec![1], 5)),
            &SpanClasses::default(),
            &mut [&mut earlier],
        );
        assert_eq!(tree.to_markup(), "ab <span class=\"tc-del\">cd</span>");
        assert_eq!(earlier, Point::new(vec![0], 1));
        assert_eq!(caret, Some(Point::root(2)));
    }

    #[test]
    fn test_wrap_keeps_backend_markup_inside() {
        let (markup, _) = wrap(
            "x<ins class=\"diff-ins\">new</ins>y",
            Point::root(1),
            Point::root(2),
        );
        assert_eq!(
            markup,
            "x<span class=\"tc-del\"><ins class=\"diff-ins\">new</ins></span>y"
        );
    }

    #[test]
    fn test_wrap_collapsed_is_noop() {
        let (markup, caret) = wrap("abc", Point::new(vec![0], 1), Point::new(vec![0], 1));
        assert_eq!(markup, "abc");
        assert_eq!(caret, None);
    }

    #[test]
    fn test_wrap_whitespace_character() {
        let (markup, _) = wrap("a b", Point::new(vec![0], 1), Point::new(vec![0], 2));
        assert_eq!(markup, "a<span class=\"tc-del\"> </span>b");
    }
}
