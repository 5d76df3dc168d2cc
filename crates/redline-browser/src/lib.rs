//! Browser DOM layer for the redline track-changes editor.
//!
//! This crate provides DOM rendering and browser event handling on top of
//! `redline-core`. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `cursor`: Selection API reads and caret restoration
//! - `dom_sync`: tree rendering and DOM ⇄ tree position mapping
//! - `events`: beforeinput and keydown parsing
//! - `platform`: Apple/other detection for the shortcut modifier
//! - `timer`: the undo batch commit timeout
//!
//! # Re-exports
//!
//! This crate re-exports `redline-core` for convenience, so consumers
//! only need to depend on `redline-browser`.

pub use redline_core;
pub use redline_core::*;

pub mod cursor;
pub mod dom_sync;
pub mod events;
pub mod platform;
pub mod timer;

pub use cursor::{BrowserCursor, read_dom_selection, write_dom_selection};
pub use dom_sync::{dom_point_to_tree, prepare_container, render_tree, set_editable, tree_point_to_dom};
pub use events::{
    BeforeInputContext, BeforeInputResult, handle_beforeinput, key_combo_from_event,
    parse_browser_input_type,
};
pub use platform::{Platform, platform};
pub use timer::BatchTimer;
