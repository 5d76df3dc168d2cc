//! Event handlers exposed to JavaScript.
//!
//! The host forwards DOM events from the mounted container to these
//! handlers. Handled events have `preventDefault` called here; the returned
//! [`EventResult`] says what happened.

use redline_browser::{
    BeforeInputContext, BeforeInputResult, EditOutcome, EditorAction, Instant, KeydownResult,
    handle_beforeinput, handle_keydown, key_combo_from_event, platform,
};
use wasm_bindgen::prelude::*;

use crate::editor::JsRedlineEditor;

/// Result of handling an event.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled and its default prevented.
    Handled,
    /// Event should pass through to browser.
    PassThrough,
}

impl From<&BeforeInputResult> for EventResult {
    fn from(r: &BeforeInputResult) -> Self {
        match r {
            BeforeInputResult::Handled(_) => EventResult::Handled,
            BeforeInputResult::PassThrough => EventResult::PassThrough,
        }
    }
}

impl From<KeydownResult> for EventResult {
    fn from(r: KeydownResult) -> Self {
        match r {
            KeydownResult::Handled => EventResult::Handled,
            KeydownResult::PassThrough | KeydownResult::NotHandled => EventResult::PassThrough,
        }
    }
}

#[wasm_bindgen]
impl JsRedlineEditor {
    // === Event handlers ===

    /// Handle a beforeinput event from the container.
    #[wasm_bindgen(js_name = handleBeforeInput)]
    pub fn handle_before_input(&mut self, event: web_sys::InputEvent) -> EventResult {
        let Some(container) = self.container.clone() else {
            return EventResult::PassThrough;
        };
        if self.composition_start.is_some() {
            return EventResult::PassThrough;
        }

        self.pull_selection();
        let ctx = BeforeInputContext::from_event(&event, &container);
        let result = handle_beforeinput(&mut self.inner.borrow_mut(), &ctx, Instant::now());

        let event_result = EventResult::from(&result);
        if event_result == EventResult::Handled {
            event.prevent_default();
        }
        match result {
            BeforeInputResult::Handled(outcome) => {
                self.after_edit(outcome);
            }
            BeforeInputResult::PassThrough => {}
        }
        event_result
    }

    /// Handle a keydown event from the container.
    #[wasm_bindgen(js_name = handleKeydown)]
    pub fn handle_keydown(&mut self, event: web_sys::KeyboardEvent) -> EventResult {
        if self.composition_start.is_some() || event.is_composing() {
            return EventResult::PassThrough;
        }
        let combo = key_combo_from_event(&event);
        let is_mac = platform().uses_meta_shortcuts();

        // History shortcuts report Handled even with nothing to undo.
        let before = self.inner.borrow().markup();
        let result = handle_keydown(&mut self.inner.borrow_mut(), &combo, is_mac, Instant::now());
        let event_result = EventResult::from(result);
        if event_result == EventResult::Handled {
            event.prevent_default();
            let changed = self.inner.borrow().markup() != before;
            if changed {
                self.after_edit(EditOutcome::Applied);
            }
        }
        event_result
    }

    /// Read the DOM selection into the editor.
    ///
    /// Call this on `selectionchange`, clicks and navigation keys.
    #[wasm_bindgen(js_name = syncSelection)]
    pub fn sync_selection(&mut self) {
        if self.composition_start.is_none() {
            self.pull_selection();
        }
    }

    /// Handle compositionstart. The browser owns the DOM until the
    /// composition ends.
    #[wasm_bindgen(js_name = handleCompositionStart)]
    pub fn handle_composition_start(&mut self) {
        self.pull_selection();
        self.composition_start = Some(self.inner.borrow().selection().clone());
        tracing::trace!(target: "redline::dom", "composition started");
    }

    /// Handle compositionend: throw away the browser's composed DOM and
    /// insert the committed text as an addition.
    #[wasm_bindgen(js_name = handleCompositionEnd)]
    pub fn handle_composition_end(&mut self, data: Option<String>) {
        let Some(selection) = self.composition_start.take() else {
            return;
        };
        // The DOM now holds uncommitted IME text; restore it from the tree.
        self.render();

        let text = data.unwrap_or_default();
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            if let Err(e) = inner.set_selection(selection) {
                tracing::warn!(target: "redline::dom", %e, "composition start no longer valid");
            }
            inner.apply_at(&EditorAction::Insert { text }, Instant::now())
        };
        self.after_edit(outcome);
    }
}
