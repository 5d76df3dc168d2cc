//! redline-core: track-changes editing without framework dependencies.
//!
//! The editable content is an HTML fragment held as a [`MarkupTree`]. Edits
//! never destroy text: deleting wraps the range in a deletion span, typing
//! lands in an addition span, and the accepted text is recovered with
//! [`extract_final_text`].
//!
//! This crate provides:
//! - `RedlineEditor` - the editing session (tree, selection, history, lifecycle)
//! - `wrap_as_deleted` / `insert_as_addition` - the two tree transforms
//! - `resolve_neighbor` / `resolve_word` - caret neighbor resolution over
//!   visible text
//! - `History` - batched undo/redo of full snapshots
//! - `CursorPlatform` / `CursorSync` - the seam to a live selection surface

pub mod actions;
pub mod config;
pub mod editor;
pub mod error;
pub mod execute;
pub mod extract;
pub mod fragment;
pub mod html;
pub mod insert;
pub mod lifecycle;
pub mod markup;
pub mod neighbor;
pub mod platform;
pub mod text_helpers;
pub mod types;
pub mod undo;
pub mod wrap;

pub use actions::{EditorAction, InputType, Key, KeyCombo, KeydownResult, Modifiers};
pub use config::EditorConfig;
pub use editor::{ModifiedCallback, RedlineEditor, RevisionSnapshot};
pub use error::{ConfigError, LifecycleError, MarkupError};
pub use execute::{apply_edit, execute_action, handle_keydown};
pub use extract::{extract_final_text, final_text_from_markup};
pub use insert::insert_as_addition;
pub use lifecycle::Lifecycle;
pub use markup::{
    ChangeStats, DIFF_DELETION_CLASS, Element, MarkupKind, MarkupTree, Node, SpanClasses,
};
pub use neighbor::{resolve_neighbor, resolve_word};
pub use platform::{CursorPlatform, CursorSync, PlatformError};
pub use smol_str::SmolStr;
pub use types::{Direction, EditOutcome, Point, Selection, TreeRange};
pub use undo::{History, Snapshot, UndoManager};
pub use web_time::Instant;
pub use wrap::wrap_as_deleted;
