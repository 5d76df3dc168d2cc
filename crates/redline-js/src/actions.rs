//! EditorAction conversion for JavaScript.

use redline_browser::EditorAction;
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// JavaScript-friendly editor action.
///
/// Mirrors `EditorAction` from core. Actions that act on a selection take an
/// optional `start`/`end` pair of text offsets; without one they act on the
/// editor's current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsEditorAction {
    // Text insertion
    Insert {
        text: String,
        #[serde(default)]
        start: Option<usize>,
        #[serde(default)]
        end: Option<usize>,
    },
    InsertLineBreak {
        #[serde(default)]
        start: Option<usize>,
        #[serde(default)]
        end: Option<usize>,
    },
    InsertParagraph {
        #[serde(default)]
        start: Option<usize>,
        #[serde(default)]
        end: Option<usize>,
    },

    // Deletion
    DeleteBackward,
    DeleteForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteToLineStart,
    DeleteToLineEnd,
    DeleteSelection {
        #[serde(default)]
        start: Option<usize>,
        #[serde(default)]
        end: Option<usize>,
    },

    // History
    Undo,
    Redo,
}

impl JsEditorAction {
    /// Text-offset range to select before running the action, if given.
    pub fn target_range(&self) -> Option<(usize, usize)> {
        match self {
            Self::Insert { start, end, .. }
            | Self::InsertLineBreak { start, end }
            | Self::InsertParagraph { start, end }
            | Self::DeleteSelection { start, end } => match (start, end) {
                (Some(start), Some(end)) => Some((*start, *end)),
                (Some(at), None) | (None, Some(at)) => Some((*at, *at)),
                (None, None) => None,
            },
            _ => None,
        }
    }

    pub fn to_editor_action(&self) -> EditorAction {
        match self {
            Self::Insert { text, .. } => EditorAction::Insert { text: text.clone() },
            Self::InsertLineBreak { .. } => EditorAction::InsertLineBreak,
            Self::InsertParagraph { .. } => EditorAction::InsertParagraph,
            Self::DeleteBackward => EditorAction::DeleteBackward,
            Self::DeleteForward => EditorAction::DeleteForward,
            Self::DeleteWordBackward => EditorAction::DeleteWordBackward,
            Self::DeleteWordForward => EditorAction::DeleteWordForward,
            Self::DeleteToLineStart => EditorAction::DeleteToLineStart,
            Self::DeleteToLineEnd => EditorAction::DeleteToLineEnd,
            Self::DeleteSelection { .. } => EditorAction::DeleteSelection,
            Self::Undo => EditorAction::Undo,
            Self::Redo => EditorAction::Redo,
        }
    }
}
