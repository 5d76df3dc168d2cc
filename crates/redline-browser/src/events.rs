//! Browser event handling for the editor.
//!
//! Provides browser-specific event extraction and input type parsing for
//! the `beforeinput` and `keydown` events. The engine owns every mutation of
//! the container, so handled events have their default prevented and the
//! container is re-rendered from the tree.

use redline_core::{
    EditOutcome, EditorAction, InputType, Instant, Key, KeyCombo, Modifiers, RedlineEditor,
    Selection, SmolStr,
};
use wasm_bindgen::prelude::*;

use crate::dom_sync::dom_point_to_tree;

// === StaticRange binding ===
//
// web-sys does not expose StaticRange, which is what
// InputEvent.getTargetRanges() returns.

#[wasm_bindgen]
extern "C" {
    /// A fixed range of the DOM that does not update when the DOM changes.
    pub type StaticRange;

    #[wasm_bindgen(method, getter, structural)]
    pub fn startContainer(this: &StaticRange) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    pub fn startOffset(this: &StaticRange) -> u32;

    #[wasm_bindgen(method, getter, structural)]
    pub fn endContainer(this: &StaticRange) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    pub fn endOffset(this: &StaticRange) -> u32;
}

// === InputType browser parsing ===

/// Parse a W3C Input Events `inputType` string.
pub fn parse_browser_input_type(s: &str) -> InputType {
    match s {
        // Insertion
        "insertText" => InputType::InsertText,
        "insertCompositionText" => InputType::InsertCompositionText,
        "insertLineBreak" => InputType::InsertLineBreak,
        "insertParagraph" => InputType::InsertParagraph,
        "insertFromPaste" => InputType::InsertFromPaste,
        "insertFromDrop" => InputType::InsertFromDrop,
        "insertReplacementText" => InputType::InsertReplacementText,
        "insertFromYank" => InputType::InsertFromYank,

        // Deletion
        "deleteContentBackward" => InputType::DeleteContentBackward,
        "deleteContentForward" => InputType::DeleteContentForward,
        "deleteWordBackward" | "deleteEntireWordBackward" => InputType::DeleteWordBackward,
        "deleteWordForward" | "deleteEntireWordForward" => InputType::DeleteWordForward,
        "deleteSoftLineBackward" | "deleteHardLineBackward" | "deleteEntireSoftLine" => {
            InputType::DeleteSoftLineBackward
        }
        "deleteSoftLineForward" | "deleteHardLineForward" => InputType::DeleteSoftLineForward,
        "deleteByCut" => InputType::DeleteByCut,
        "deleteByDrag" => InputType::DeleteByDrag,
        "deleteContent" => InputType::DeleteContent,

        // History
        "historyUndo" => InputType::HistoryUndo,
        "historyRedo" => InputType::HistoryRedo,

        other if other.starts_with("format") => InputType::Format(SmolStr::new(other)),

        other => InputType::Unknown(other.to_string()),
    }
}

// === BeforeInput event handling ===

/// Result of handling a beforeinput event.
#[derive(Debug, Clone, PartialEq)]
pub enum BeforeInputResult {
    /// Prevent the browser default. Carries what the engine did.
    Handled(EditOutcome),
    /// Let the browser act (IME composition, which cannot be cancelled).
    PassThrough,
}

/// Context for beforeinput handling.
#[derive(Debug, Clone)]
pub struct BeforeInputContext {
    pub input_type: InputType,
    /// The text to insert, if any.
    pub data: Option<String>,
    /// Range from getTargetRanges(), already mapped to tree points.
    pub target_range: Option<Selection>,
    /// Whether the event is part of an IME composition.
    pub is_composing: bool,
}

impl BeforeInputContext {
    /// Read the context off a live event.
    pub fn from_event(event: &web_sys::InputEvent, container: &web_sys::Node) -> Self {
        Self {
            input_type: get_input_type_from_event(event),
            data: get_data_from_event(event),
            target_range: get_target_range_from_event(event, container),
            is_composing: event.is_composing(),
        }
    }
}

/// Handle a beforeinput event against the editor's current selection.
///
/// The caller syncs the editor selection from the DOM first. The browser's
/// target range only overrides it for insertions (spell-check replacement
/// targets a word the caret is not selecting). Deletions keep the synced
/// caret, because the browser's notion of "previous character" would land
/// inside struck content.
pub fn handle_beforeinput(
    editor: &mut RedlineEditor,
    ctx: &BeforeInputContext,
    now: Instant,
) -> BeforeInputResult {
    if ctx.is_composing || ctx.input_type == InputType::InsertCompositionText {
        return BeforeInputResult::PassThrough;
    }
    if !editor.lifecycle().is_editing() {
        return BeforeInputResult::Handled(EditOutcome::Ignored);
    }

    if ctx.input_type.is_insertion() {
        if let Some(range) = &ctx.target_range {
            if let Err(err) = editor.set_selection(range.clone()) {
                tracing::warn!(target: "redline::dom", %err, "ignoring target range");
            }
        }
    }

    let Some(action) = EditorAction::from_input(&ctx.input_type, ctx.data.as_deref()) else {
        tracing::trace!(
            target: "redline::edit",
            input_type = ?ctx.input_type,
            "input swallowed"
        );
        return BeforeInputResult::Handled(EditOutcome::NoOp);
    };
    BeforeInputResult::Handled(editor.apply_at(&action, now))
}

/// Extract the target range from a beforeinput event as tree points.
pub fn get_target_range_from_event(
    event: &web_sys::InputEvent,
    container: &web_sys::Node,
) -> Option<Selection> {
    let ranges = event.get_target_ranges();
    if ranges.length() == 0 {
        return None;
    }
    let static_range: StaticRange = ranges.get(0).unchecked_into();

    let start = dom_point_to_tree(
        container,
        &static_range.startContainer(),
        static_range.startOffset(),
    )?;
    let end = dom_point_to_tree(container, &static_range.endContainer(), static_range.endOffset())?;
    Some(Selection::new(start, end))
}

/// Get data from a beforeinput event, handling different sources.
pub fn get_data_from_event(event: &web_sys::InputEvent) -> Option<String> {
    if let Some(data) = event.data() {
        if !data.is_empty() {
            return Some(data);
        }
    }

    // Paste and drop carry their text in dataTransfer.
    if let Some(data_transfer) = event.data_transfer() {
        if let Ok(text) = data_transfer.get_data("text/plain") {
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    None
}

pub fn get_input_type_from_event(event: &web_sys::InputEvent) -> InputType {
    parse_browser_input_type(&event.input_type())
}

/// Key combination of a keydown event.
pub fn key_combo_from_event(event: &web_sys::KeyboardEvent) -> KeyCombo {
    KeyCombo::with_modifiers(
        Key::from_dom_key(&event.key()),
        Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
    )
}
