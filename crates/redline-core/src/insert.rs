//! Text insertion as tracked additions.

use crate::fragment::insert_node;
use crate::markup::{MarkupKind, MarkupTree, Node, SpanClasses, char_to_byte, split_path};
use crate::types::Point;

/// Insert `text` at `caret` as an addition and return the caret after it.
///
/// Typing next to or inside an existing addition span extends that span, so a
/// run of keystrokes produces one span instead of one per character. Text
/// never lands inside struck content: a caret in a deletion span or in the
/// backend's struck markup is moved to just after it first.
pub fn insert_as_addition(
    tree: &mut MarkupTree,
    caret: &Point,
    text: &str,
    classes: &SpanClasses,
) -> Point {
    if text.is_empty() {
        return caret.clone();
    }

    let mut caret = if tree.is_valid_point(caret) {
        caret.clone()
    } else {
        tracing::debug!(target: "redline::edit", ?caret, "caret outside content, appending");
        tree.end_point()
    };
    if let Some(struck) = tree.outermost_ancestor(&caret.path, classes, MarkupKind::is_struck) {
        caret = Point::after_node(&struck);
    }

    let added = text.chars().count();
    let is_addition = |tree: &MarkupTree, path: &[usize]| {
        !path.is_empty()
            && tree
                .element(path)
                .map(|el| classes.classify(el) == MarkupKind::Addition)
                .unwrap_or(false)
    };

    // Caret inside the text of an addition span.
    if let Some(Node::Text(_)) = tree.node(&caret.path) {
        let (parent, _) = split_path(&caret.path);
        if is_addition(tree, parent) {
            if let Some(Node::Text(existing)) = tree.node_mut(&caret.path) {
                let byte = char_to_byte(existing, caret.offset);
                existing.insert_str(byte, text);
                return Point::new(caret.path, caret.offset + added);
            }
        }
    }

    // Caret between the children of an addition span.
    if is_addition(tree, &caret.path) {
        return insert_into_span(tree, &caret.path, caret.offset, text);
    }

    // Caret right after an addition span.
    if let Some(before) = node_before(tree, &caret) {
        if is_addition(tree, &before) {
            let end = tree.boundary_len(&before).unwrap_or(0);
            return insert_into_span(tree, &before, end, text);
        }
    }

    let span = Node::Element(
        classes
            .addition_span()
            .with_children(vec![Node::text(text)]),
    );
    let path = match insert_node(tree, &caret, span.clone(), &mut []) {
        Some(path) => path,
        None => {
            let end = tree.end_point();
            match insert_node(tree, &end, span, &mut []) {
                Some(path) => path,
                None => return caret,
            }
        }
    };
    tracing::trace!(target: "redline::edit", ?path, "new addition span");
    let mut text_path = path;
    text_path.push(0);
    Point::new(text_path, added)
}

/// Insert text at child index `at` of the addition span at `span`, merging
/// with a neighboring text node when there is one.
fn insert_into_span(tree: &mut MarkupTree, span: &[usize], at: usize, text: &str) -> Point {
    let added = text.chars().count();
    let Some(el) = tree.element_mut(span) else {
        return Point::new(span.to_vec(), at);
    };
    let at = at.min(el.children.len());
    let mut path = span.to_vec();

    if at > 0 {
        if let Some(Node::Text(prev)) = el.children.get_mut(at - 1) {
            let offset = prev.chars().count() + added;
            prev.push_str(text);
            path.push(at - 1);
            return Point::new(path, offset);
        }
    }
    if let Some(Node::Text(next)) = el.children.get_mut(at) {
        next.insert_str(0, text);
        path.push(at);
        return Point::new(path, added);
    }
    el.children.insert(at, Node::text(text));
    path.push(at);
    Point::new(path, added)
}

/// Path of the node immediately before `point`, when that is a whole node
/// rather than a character of the same text node.
fn node_before(tree: &MarkupTree, point: &Point) -> Option<Vec<usize>> {
    match tree.node(&point.path) {
        Some(Node::Text(_)) => {
            if point.offset > 0 {
                return None;
            }
            let (parent, idx) = split_path(&point.path);
            let mut path = parent.to_vec();
            path.push(idx.checked_sub(1)?);
            Some(path)
        }
        _ => {
            let mut path = point.path.clone();
            path.push(point.offset.checked_sub(1)?);
            Some(path)
        }
    }
}
