//! WASM browser tests for the JS bindings.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use redline_js::{JsEditorAction, JsLifecycle, JsRedlineEditor};

fn mounted(seed: &str) -> (JsRedlineEditor, web_sys::HtmlElement) {
    mounted_with(seed, JsValue::UNDEFINED)
}

fn mounted_with(seed: &str, config: JsValue) -> (JsRedlineEditor, web_sys::HtmlElement) {
    let document = web_sys::window().unwrap().document().unwrap();
    let div = document
        .create_element("div")
        .unwrap()
        .dyn_into::<web_sys::HtmlElement>()
        .unwrap();
    document.body().unwrap().append_child(&div).unwrap();

    let mut editor = JsRedlineEditor::new(seed, config)
        .ok()
        .expect("config is valid");
    editor.mount(div.clone(), false).ok().expect("mount");
    (editor, div)
}

#[wasm_bindgen_test]
fn test_mount_renders_seed() {
    let (editor, div) = mounted("Payment is due within 30 days.");
    assert_eq!(div.inner_html(), "Payment is due within 30 days.");
    assert_eq!(div.content_editable(), "true");
    assert_eq!(editor.get_lifecycle(), JsLifecycle::Editing);
    div.remove();
}

#[wasm_bindgen_test]
fn test_execute_action_updates_dom() {
    let (mut editor, div) = mounted("Payment is due within 30 days.");
    let replaced = editor
        .execute_action(JsEditorAction::Insert {
            text: "45".into(),
            start: Some(22),
            end: Some(24),
        })
        .ok()
        .expect("offsets are in range");
    assert!(replaced);

    let expected = "Payment is due within <span class=\"tc-del\">30</span><span class=\"tc-ins\">45</span> days.";
    assert_eq!(editor.get_markup(), expected);
    assert_eq!(div.inner_html(), expected);
    assert_eq!(editor.extract_final_text(), "Payment is due within 45 days.");

    let snapshot = editor.get_snapshot();
    assert!(snapshot.modified);
    assert_eq!(snapshot.final_text, "Payment is due within 45 days.");
    div.remove();
}

#[wasm_bindgen_test]
fn test_undo_then_read_only() {
    let (mut editor, div) = mounted("abc");
    assert_eq!(
        editor.execute_action(JsEditorAction::DeleteBackward).ok(),
        Some(true)
    );
    assert!(editor.undo());
    assert_eq!(div.inner_html(), "abc");

    assert!(editor.set_read_only(true).is_ok());
    assert_eq!(div.content_editable(), "false");
    assert_eq!(
        editor.execute_action(JsEditorAction::DeleteBackward).ok(),
        Some(false)
    );
    div.remove();
}

#[wasm_bindgen_test]
fn test_invalid_config_is_rejected() {
    let config = js_sys::JSON::parse(r#"{"historyDepth": 0}"#).unwrap();
    assert!(JsRedlineEditor::new("x", config).is_err());
}

const WINDOW_MS: u32 = 20;

/// Mounted editor with a short batch window and one uncommitted edit.
fn typed(seed: &str) -> (JsRedlineEditor, web_sys::HtmlElement) {
    let config = js_sys::JSON::parse(&format!(r#"{{"batchWindowMs": {WINDOW_MS}}}"#)).unwrap();
    let (mut editor, div) = mounted_with(seed, config);
    assert_eq!(
        editor
            .execute_action(JsEditorAction::Insert {
                text: "!".into(),
                start: None,
                end: None,
            })
            .ok(),
        Some(true)
    );
    assert!(editor.has_pending_commit());
    (editor, div)
}

async fn past_window() {
    TimeoutFuture::new(WINDOW_MS * 4).await;
}

#[wasm_bindgen_test]
async fn test_batch_commit_fires_after_window() {
    let (editor, div) = typed("abc");
    past_window().await;
    assert!(!editor.has_pending_commit());
    assert!(editor.can_undo());
    div.remove();
}

#[wasm_bindgen_test]
async fn test_reseed_cancels_pending_commit() {
    let (mut editor, div) = typed("abc");
    editor.reseed("next clause");
    assert!(!editor.has_pending_commit());

    past_window().await;
    assert!(!editor.has_pending_commit());
    assert!(!editor.can_undo());
    assert_eq!(editor.get_markup(), "next clause");
    assert_eq!(div.inner_html(), "next clause");
    div.remove();
}

#[wasm_bindgen_test]
async fn test_reset_and_lock_cancel_pending_commit() {
    let (mut editor, div) = typed("abc");
    assert!(editor.set_read_only(true).is_ok());
    assert!(!editor.has_pending_commit());
    past_window().await;
    let locked_markup = editor.get_markup();
    assert_eq!(locked_markup, "abc<span class=\"tc-ins\">!</span>");

    assert!(editor.set_read_only(false).is_ok());
    assert_eq!(
        editor.execute_action(JsEditorAction::DeleteBackward).ok(),
        Some(true)
    );
    assert!(editor.has_pending_commit());
    assert!(editor.reset().is_ok());
    assert!(!editor.has_pending_commit());
    past_window().await;
    assert_eq!(editor.get_markup(), "abc");
    assert!(!editor.can_undo());
    assert!(!editor.is_modified());
    div.remove();
}

#[wasm_bindgen_test]
async fn test_unmount_flushes_and_cancels() {
    let (mut editor, div) = typed("abc");
    editor.unmount();
    assert!(!editor.has_pending_commit());
    assert!(editor.can_undo());
    let markup = editor.get_markup();

    past_window().await;
    assert_eq!(editor.get_markup(), markup);
    assert_eq!(div.content_editable(), "false");
    div.remove();
}
