//! DOM synchronization for the track-changes editor.
//!
//! The container's DOM is always a one-to-one rendering of the editor's
//! [`MarkupTree`]: every tree node becomes exactly one DOM node, empty text
//! nodes included. A tree path therefore indexes the same DOM child lists,
//! and converting a DOM `(node, offset)` pair to a [`Point`] is a walk up to
//! the container collecting child indices.
//!
//! The only unit conversion is inside text nodes, where the DOM counts
//! UTF-16 code units and the tree counts chars.

use redline_core::{MarkupTree, Node, PlatformError, Point};

/// Replace the container's children with a rendering of `tree`.
pub fn render_tree(container: &web_sys::Node, tree: &MarkupTree) -> Result<(), PlatformError> {
    let document = container
        .owner_document()
        .ok_or("container has no owner document")?;

    container.set_text_content(None);
    for node in tree.children() {
        let child = build_dom_node(&document, node)?;
        container
            .append_child(&child)
            .map_err(|e| format!("append_child failed: {:?}", e))?;
    }
    tracing::trace!(
        target: "redline::dom",
        children = tree.children().len(),
        "rendered tree"
    );
    Ok(())
}

fn build_dom_node(document: &web_sys::Document, node: &Node) -> Result<web_sys::Node, PlatformError> {
    match node {
        Node::Text(text) => Ok(document.create_text_node(text).into()),
        Node::Element(el) => {
            // A tag the DOM rejects still needs a node in its slot.
            let element = document
                .create_element(&el.tag)
                .or_else(|_| document.create_element("span"))
                .map_err(|e| format!("create_element({}) failed: {:?}", el.tag, e))?;
            for (name, value) in &el.attrs {
                if let Err(e) = element.set_attribute(name, value) {
                    tracing::warn!(target: "redline::dom", %name, ?e, "dropped attribute");
                }
            }
            for child in &el.children {
                let child = build_dom_node(document, child)?;
                element
                    .append_child(&child)
                    .map_err(|e| format!("append_child failed: {:?}", e))?;
            }
            Ok(element.into())
        }
    }
}

/// Convert a DOM boundary point inside `container` to a tree point.
///
/// Returns `None` when `node` is not a descendant of the container (or the
/// container itself).
pub fn dom_point_to_tree(
    container: &web_sys::Node,
    node: &web_sys::Node,
    offset: u32,
) -> Option<Point> {
    let mut path = Vec::new();
    let mut current = node.clone();
    while !current.is_same_node(Some(container)) {
        let parent = current.parent_node()?;
        path.push(child_index(&parent, &current)?);
        current = parent;
    }
    path.reverse();

    let offset = if node.node_type() == web_sys::Node::TEXT_NODE {
        let text = node.text_content().unwrap_or_default();
        utf16_to_char_offset(&text, offset as usize)
    } else {
        offset as usize
    };
    Some(Point::new(path, offset))
}

/// Convert a tree point to a DOM boundary point inside `container`.
pub fn tree_point_to_dom(container: &web_sys::Node, point: &Point) -> Option<(web_sys::Node, u32)> {
    let mut node = container.clone();
    for &idx in &point.path {
        node = node.child_nodes().item(u32::try_from(idx).ok()?)?;
    }
    let offset = if node.node_type() == web_sys::Node::TEXT_NODE {
        let text = node.text_content().unwrap_or_default();
        char_to_utf16_offset(&text, point.offset)
    } else {
        point.offset.min(node.child_nodes().length() as usize)
    };
    Some((node, u32::try_from(offset).ok()?))
}

fn child_index(parent: &web_sys::Node, child: &web_sys::Node) -> Option<usize> {
    let children = parent.child_nodes();
    (0..children.length())
        .find(|&i| {
            children
                .item(i)
                .map(|node| node.is_same_node(Some(child)))
                .unwrap_or(false)
        })
        .map(|i| i as usize)
}

/// Char offset for a UTF-16 offset into `text`.
///
/// An offset that splits a surrogate pair lands after the pair.
pub fn utf16_to_char_offset(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.chars().enumerate() {
        if units >= utf16 {
            return i;
        }
        units += c.len_utf16();
    }
    text.chars().count()
}

/// UTF-16 offset for a char offset into `text`.
pub fn char_to_utf16_offset(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

/// Make `container` an editing surface: `contenteditable` per `editable`, and
/// whitespace preserved so newline characters inside additions render as
/// line breaks.
pub fn prepare_container(container: &web_sys::HtmlElement, editable: bool) -> Result<(), PlatformError> {
    container
        .style()
        .set_property("white-space", "pre-wrap")
        .map_err(|e| format!("set white-space failed: {:?}", e))?;
    set_editable(container, editable);
    Ok(())
}

pub fn set_editable(container: &web_sys::HtmlElement, editable: bool) {
    container.set_content_editable(if editable { "true" } else { "false" });
}
