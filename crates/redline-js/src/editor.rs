//! JsRedlineEditor - the editor handle for JavaScript.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use redline_browser::{
    BatchTimer, BrowserCursor, CursorPlatform, CursorSync, EditOutcome, EditorConfig, Instant,
    RedlineEditor, Selection, prepare_container, render_tree, set_editable,
};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::actions::JsEditorAction;
use crate::types::{JsChangeStats, JsLifecycle, JsRevision};

/// One track-changes editor, mounted on one container element.
///
/// Instances share nothing: each owns its tree, history and batch timer.
#[wasm_bindgen]
pub struct JsRedlineEditor {
    /// Shared with the batch timer callback.
    pub(crate) inner: Rc<RefCell<RedlineEditor>>,
    pub(crate) container: Option<HtmlElement>,
    pub(crate) cursor: Option<BrowserCursor>,
    pub(crate) timer: BatchTimer,
    /// Selection when the open IME composition started.
    pub(crate) composition_start: Option<Selection>,
}

#[wasm_bindgen]
impl JsRedlineEditor {
    /// Create an editor seeded with markup.
    ///
    /// `config` is an optional plain object (`batchWindowMs`, `historyDepth`,
    /// `additionClass`, `deletionClass`, `restoreCaret`).
    #[wasm_bindgen(constructor)]
    pub fn new(seed: &str, config: JsValue) -> Result<JsRedlineEditor, JsError> {
        let editor = RedlineEditor::with_config(seed, parse_config(config)?)?;
        Ok(Self::from_inner(editor))
    }

    /// Create an editor seeded with plain text. Newlines become line breaks.
    #[wasm_bindgen(js_name = fromPlainText)]
    pub fn from_plain_text(text: &str, config: JsValue) -> Result<JsRedlineEditor, JsError> {
        let editor = RedlineEditor::from_plain_text(text, parse_config(config)?)?;
        Ok(Self::from_inner(editor))
    }

    // === Mounting ===

    /// Take over `container`: render the seed into it and, unless
    /// `read_only`, start editing.
    pub fn mount(&mut self, container: HtmlElement, read_only: bool) -> Result<(), JsError> {
        if !read_only {
            self.inner.borrow_mut().enable_editing()?;
        }
        let editable = self.inner.borrow().lifecycle().is_editing();
        prepare_container(&container, editable).map_err(|e| JsError::new(&e.to_string()))?;
        self.cursor = Some(BrowserCursor::new(container.clone().into()));
        self.container = Some(container);
        self.render();
        tracing::debug!(target: "redline::dom", editable, "mounted");
        Ok(())
    }

    /// Release the container. The open undo batch is committed and its
    /// timer cleared, so nothing fires against a detached element.
    pub fn unmount(&mut self) {
        self.timer.cancel();
        self.inner.borrow_mut().flush_batch();
        if let Some(container) = self.container.take() {
            set_editable(&container, false);
        }
        self.cursor = None;
        tracing::debug!(target: "redline::dom", "unmounted");
    }

    /// Callback invoked with the modified flag after every change.
    ///
    /// It runs in a microtask, so it may call back into the editor.
    #[wasm_bindgen(js_name = setOnModified)]
    pub fn set_on_modified(&mut self, callback: Option<js_sys::Function>) {
        let mut inner = self.inner.borrow_mut();
        match callback {
            Some(callback) => inner.set_on_modified(move |modified| {
                let callback = callback.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_bool(modified)) {
                        tracing::warn!(target: "redline::edit", ?e, "onModified threw");
                    }
                });
            }),
            None => inner.clear_on_modified(),
        }
    }

    // === Content access ===

    /// Current annotated markup.
    #[wasm_bindgen(js_name = getMarkup)]
    pub fn get_markup(&self) -> String {
        self.inner.borrow().markup()
    }

    /// Plain text with every tracked change accepted.
    #[wasm_bindgen(js_name = extractFinalText)]
    pub fn extract_final_text(&self) -> String {
        self.inner.borrow().extract_final_text()
    }

    #[wasm_bindgen(js_name = visibleText)]
    pub fn visible_text(&self) -> String {
        self.inner.borrow().visible_text()
    }

    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> JsRevision {
        self.inner.borrow().snapshot().into()
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> JsChangeStats {
        self.inner.borrow().stats().into()
    }

    #[wasm_bindgen(js_name = isModified)]
    pub fn is_modified(&self) -> bool {
        self.inner.borrow().is_modified()
    }

    /// Whether an undo batch commit is scheduled and still to fire.
    #[wasm_bindgen(js_name = hasPendingCommit)]
    pub fn has_pending_commit(&self) -> bool {
        self.timer.is_scheduled()
    }

    #[wasm_bindgen(js_name = getLifecycle)]
    pub fn get_lifecycle(&self) -> JsLifecycle {
        self.inner.borrow().lifecycle().into()
    }

    // === History ===

    pub fn undo(&mut self) -> bool {
        let outcome = self.inner.borrow_mut().undo();
        self.after_edit(outcome)
    }

    pub fn redo(&mut self) -> bool {
        let outcome = self.inner.borrow_mut().redo();
        self.after_edit(outcome)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.borrow().can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.borrow().can_redo()
    }

    // === Lifecycle ===

    /// Toggle between editing and read-only.
    #[wasm_bindgen(js_name = setReadOnly)]
    pub fn set_read_only(&mut self, read_only: bool) -> Result<(), JsError> {
        if read_only {
            self.timer.cancel();
        }
        self.inner.borrow_mut().set_read_only(read_only)?;
        self.sync_editable();
        Ok(())
    }

    /// Discard every edit and show the seed again. Editing stops until the
    /// host enables it with `setReadOnly(false)`.
    pub fn reset(&mut self) -> Result<(), JsError> {
        self.timer.cancel();
        self.inner.borrow_mut().reset()?;
        self.render();
        self.sync_editable();
        Ok(())
    }

    /// Load a different target. History and the open batch are dropped.
    pub fn reseed(&mut self, markup: &str) {
        self.timer.cancel();
        self.inner.borrow_mut().reseed(markup);
        self.render();
        self.sync_editable();
    }

    // === Programmatic actions ===

    /// Run an action. Offsets in the action are text offsets.
    #[wasm_bindgen(js_name = executeAction)]
    pub fn execute_action(&mut self, action: JsEditorAction) -> Result<bool, JsError> {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            if let Some((start, end)) = action.target_range() {
                inner.select_text_range(start, end)?;
            }
            inner.apply_at(&action.to_editor_action(), Instant::now())
        };
        Ok(self.after_edit(outcome))
    }
}

impl JsRedlineEditor {
    pub(crate) fn from_inner(editor: RedlineEditor) -> Self {
        Self {
            inner: Rc::new(RefCell::new(editor)),
            container: None,
            cursor: None,
            timer: BatchTimer::new(),
            composition_start: None,
        }
    }

    /// Re-render and schedule the batch commit after an edit. Returns
    /// whether the markup changed.
    pub(crate) fn after_edit(&mut self, outcome: EditOutcome) -> bool {
        if !outcome.is_applied() {
            return false;
        }
        self.render();
        self.schedule_commit();
        true
    }

    /// Render the tree into the container and put the caret back.
    pub(crate) fn render(&self) {
        let (Some(container), Some(cursor)) = (&self.container, &self.cursor) else {
            return;
        };
        let inner = self.inner.borrow();
        if let Err(e) = render_tree(container, inner.tree()) {
            tracing::warn!(target: "redline::dom", %e, "render failed");
            return;
        }
        if let Err(e) = cursor.restore_selection(inner.selection()) {
            tracing::warn!(target: "redline::dom", %e, "caret restore failed");
        }
    }

    /// Read the DOM selection into the editor.
    pub(crate) fn pull_selection(&self) {
        let Some(cursor) = &self.cursor else {
            return;
        };
        if let Some(selection) = cursor.read_selection() {
            if let Err(e) = self.inner.borrow_mut().set_selection(selection) {
                tracing::warn!(target: "redline::dom", %e, "DOM selection not in tree");
            }
        }
    }

    fn schedule_commit(&mut self) {
        let Some(deadline) = self.inner.borrow().batch_deadline() else {
            return;
        };
        let weak: Weak<RefCell<RedlineEditor>> = Rc::downgrade(&self.inner);
        self.timer.schedule(deadline, Instant::now(), move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            // The timer is replaced on every edit, so firing means the
            // window elapsed.
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.flush_batch();
            }
        });
    }

    fn sync_editable(&self) {
        if let Some(container) = &self.container {
            set_editable(container, self.inner.borrow().lifecycle().is_editing());
        }
    }
}

fn parse_config(config: JsValue) -> Result<EditorConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(EditorConfig::default());
    }
    serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))
}
