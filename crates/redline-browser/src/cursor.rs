//! Browser implementation of cursor platform operations.
//!
//! Uses the DOM Selection API to read and place the caret inside one
//! editable container.

use redline_core::{CursorPlatform, CursorSync, PlatformError, Selection};

use crate::dom_sync::{dom_point_to_tree, tree_point_to_dom};

/// Browser-based cursor handling for one container element.
#[derive(Debug, Clone)]
pub struct BrowserCursor {
    container: web_sys::Element,
}

impl BrowserCursor {
    pub fn new(container: web_sys::Element) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &web_sys::Element {
        &self.container
    }
}

impl CursorPlatform for BrowserCursor {
    fn restore_selection(&self, selection: &Selection) -> Result<(), PlatformError> {
        write_dom_selection(&self.container, selection)
    }
}

impl CursorSync for BrowserCursor {
    fn read_selection(&self) -> Option<Selection> {
        read_dom_selection(&self.container)
    }
}

/// Read the document selection as tree points, if it lies inside `container`.
pub fn read_dom_selection(container: &web_sys::Node) -> Option<Selection> {
    let selection = web_sys::window()?.get_selection().ok()??;
    let anchor_node = selection.anchor_node()?;
    let focus_node = selection.focus_node()?;
    if !container.contains(Some(&anchor_node)) || !container.contains(Some(&focus_node)) {
        return None;
    }

    let anchor = dom_point_to_tree(container, &anchor_node, selection.anchor_offset());
    let head = dom_point_to_tree(container, &focus_node, selection.focus_offset());
    match (anchor, head) {
        (Some(anchor), Some(head)) => Some(Selection::new(anchor, head)),
        _ => {
            tracing::warn!(target: "redline::dom", "could not map DOM selection to tree points");
            None
        }
    }
}

/// Place the document selection at `selection`, keeping its direction.
pub fn write_dom_selection(
    container: &web_sys::Node,
    selection: &Selection,
) -> Result<(), PlatformError> {
    let (anchor_node, anchor_offset) = tree_point_to_dom(container, &selection.anchor)
        .ok_or_else(|| format!("anchor {:?} not in DOM", selection.anchor))?;
    let (focus_node, focus_offset) = tree_point_to_dom(container, &selection.head)
        .ok_or_else(|| format!("head {:?} not in DOM", selection.head))?;

    let dom_selection = web_sys::window()
        .ok_or("no window")?
        .get_selection()
        .map_err(|e| format!("get_selection failed: {:?}", e))?
        .ok_or("no selection object")?;
    dom_selection
        .set_base_and_extent(&anchor_node, anchor_offset, &focus_node, focus_offset)
        .map_err(|e| format!("set_base_and_extent failed: {:?}", e))?;

    tracing::trace!(
        target: "redline::dom",
        anchor = ?selection.anchor,
        head = ?selection.head,
        "restored selection"
    );
    Ok(())
}
