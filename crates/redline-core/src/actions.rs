//! Editor actions and input types.
//!
//! Platform-agnostic definitions for editor operations. The `EditorAction` enum
//! represents semantic editing operations, while `InputType` represents the
//! semantic intent from input events (browser beforeinput, programmatic input).

use smol_str::SmolStr;

/// Semantic input types from input events.
///
/// Mirrors the W3C Input Events `inputType` values. Browser `beforeinput` events
/// and programmatic input both produce these types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    // === Insertion ===
    /// Insert typed text.
    InsertText,
    /// Insert text from IME composition.
    InsertCompositionText,
    /// Insert a line break (Shift+Enter).
    InsertLineBreak,
    /// Insert a paragraph break (Enter).
    InsertParagraph,
    /// Insert from paste operation.
    InsertFromPaste,
    /// Insert from drop operation.
    InsertFromDrop,
    /// Insert replacement text (e.g., spell check correction).
    InsertReplacementText,
    /// Insert from a kill buffer.
    InsertFromYank,

    // === Deletion ===
    /// Delete content backward (Backspace).
    DeleteContentBackward,
    /// Delete content forward (Delete key).
    DeleteContentForward,
    /// Delete word backward (Ctrl/Alt+Backspace).
    DeleteWordBackward,
    /// Delete word forward (Ctrl/Alt+Delete).
    DeleteWordForward,
    /// Delete to a line boundary backward.
    DeleteSoftLineBackward,
    /// Delete to a line boundary forward.
    DeleteSoftLineForward,
    /// Delete by cut operation.
    DeleteByCut,
    /// Delete by drag operation.
    DeleteByDrag,
    /// Generic content deletion.
    DeleteContent,

    // === History ===
    HistoryUndo,
    HistoryRedo,

    // === Formatting ===
    /// Any `format*` input. Formatting is not supported and is swallowed.
    Format(SmolStr),

    /// Unrecognized input type.
    Unknown(String),
}

impl InputType {
    /// Whether this input type is an insertion operation.
    pub fn is_insertion(&self) -> bool {
        matches!(
            self,
            Self::InsertText
                | Self::InsertCompositionText
                | Self::InsertLineBreak
                | Self::InsertParagraph
                | Self::InsertFromPaste
                | Self::InsertFromDrop
                | Self::InsertReplacementText
                | Self::InsertFromYank
        )
    }
}

/// All possible editor actions.
///
/// Actions apply to the editor's current selection, which the platform layer
/// syncs from the live surface before dispatching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Insert text at the caret, replacing any selected content.
    Insert { text: String },

    /// Insert a soft line break (Shift+Enter).
    InsertLineBreak,

    /// Insert a paragraph break (Enter).
    InsertParagraph,

    /// Delete content backward (Backspace).
    DeleteBackward,

    /// Delete content forward (Delete key).
    DeleteForward,

    /// Delete word backward (Ctrl/Alt+Backspace).
    DeleteWordBackward,

    /// Delete word forward (Ctrl/Alt+Delete).
    DeleteWordForward,

    /// Delete to start of line (Cmd+Backspace on Mac).
    DeleteToLineStart,

    /// Delete to end of line (Cmd+Delete on Mac).
    DeleteToLineEnd,

    /// Delete the selection; nothing happens for a caret.
    DeleteSelection,

    /// Undo the last change.
    Undo,

    /// Redo the last undone change.
    Redo,
}

impl EditorAction {
    /// Action for an input event, if the editor handles it.
    ///
    /// `data` is the event's text payload (typed or pasted text).
    pub fn from_input(input_type: &InputType, data: Option<&str>) -> Option<Self> {
        let text = || {
            data.filter(|d| !d.is_empty())
                .map(|d| Self::Insert {
                    text: d.replace("\r\n", "\n"),
                })
        };
        match input_type {
            InputType::InsertText
            | InputType::InsertFromPaste
            | InputType::InsertFromDrop
            | InputType::InsertReplacementText
            | InputType::InsertFromYank => text(),
            InputType::InsertLineBreak => Some(Self::InsertLineBreak),
            InputType::InsertParagraph => Some(Self::InsertParagraph),
            InputType::DeleteContentBackward => Some(Self::DeleteBackward),
            InputType::DeleteContentForward => Some(Self::DeleteForward),
            InputType::DeleteWordBackward => Some(Self::DeleteWordBackward),
            InputType::DeleteWordForward => Some(Self::DeleteWordForward),
            InputType::DeleteSoftLineBackward => Some(Self::DeleteToLineStart),
            InputType::DeleteSoftLineForward => Some(Self::DeleteToLineEnd),
            InputType::DeleteByCut | InputType::DeleteByDrag | InputType::DeleteContent => {
                Some(Self::DeleteSelection)
            }
            InputType::HistoryUndo => Some(Self::Undo),
            InputType::HistoryRedo => Some(Self::Redo),
            InputType::InsertCompositionText | InputType::Format(_) | InputType::Unknown(_) => {
                None
            }
        }
    }
}

/// Key values for keyboard input.
///
/// Platform-agnostic key representation. Platform-specific code converts
/// from native key events to this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    // === Modifiers ===
    Alt,
    Control,
    Meta,
    Shift,

    // === Editing commands ===
    Undo,
    Redo,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" => Self::Escape,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Alt" => Self::Alt,
            "Control" => Self::Control,
            "Meta" => Self::Meta,
            "Shift" => Self::Shift,
            "Undo" => Self::Undo,
            "Redo" => Self::Redo,
            "Unidentified" | "" => Self::Unidentified,
            other => Self::Character(SmolStr::new(other)),
        }
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Alt | Self::Control | Self::Meta | Self::Shift)
    }

    /// Whether this is the character key `c`, ignoring case.
    pub fn is_char(&self, c: char) -> bool {
        match self {
            Self::Character(s) => {
                let mut chars = s.chars();
                matches!((chars.next(), chars.next()), (Some(k), None) if k.eq_ignore_ascii_case(&c))
            }
            _ => false,
        }
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const META_SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: true,
    };
}

/// A key combination for triggering an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not a keybinding, let platform handle it.
    NotHandled,
    /// Event should be passed through (navigation, etc.).
    PassThrough,
}
