//! Action execution.
//!
//! `execute_action` is the central dispatch point for editor operations. Tree
//! edits go through [`apply_edit`], which composes the converter, inserter and
//! neighbor resolver; history actions go to the editor's undo stacks.

use web_time::Instant;

use crate::actions::{EditorAction, Key, KeyCombo, KeydownResult};
use crate::editor::RedlineEditor;
use crate::insert::insert_as_addition;
use crate::markup::{MarkupTree, SpanClasses};
use crate::neighbor::{resolve_line, resolve_neighbor, resolve_word, visible_runs};
use crate::types::{Direction, EditOutcome, Point, Selection, TreeRange};
use crate::wrap::{wrap_as_deleted, wrap_as_deleted_keeping};

/// Execute an editor action against the editor's current selection.
pub fn execute_action(
    editor: &mut RedlineEditor,
    action: &EditorAction,
    now: Instant,
) -> EditOutcome {
    let outcome = match action {
        EditorAction::Undo => editor.undo(),
        EditorAction::Redo => editor.redo(),
        _ => editor.edit_with(now, |tree, selection, classes| {
            apply_edit(tree, selection, action, classes)
        }),
    };
    tracing::trace!(target: "redline::edit", ?action, ?outcome, "executed action");
    outcome
}

/// Apply a non-history action to the tree. Returns the new caret, or `None`
/// when the action had nothing to do.
pub fn apply_edit(
    tree: &mut MarkupTree,
    selection: &Selection,
    action: &EditorAction,
    classes: &SpanClasses,
) -> Option<Point> {
    let range = selection.to_range();
    match action {
        EditorAction::Insert { text } => insert_text(tree, &range, text, classes),
        EditorAction::InsertLineBreak | EditorAction::InsertParagraph => {
            insert_text(tree, &range, "\n", classes)
        }
        EditorAction::DeleteBackward => delete_with(tree, &range, classes, |tree, caret| {
            resolve_neighbor(tree, caret, Direction::Backward, classes)
        }),
        EditorAction::DeleteForward => delete_with(tree, &range, classes, |tree, caret| {
            resolve_neighbor(tree, caret, Direction::Forward, classes)
        }),
        EditorAction::DeleteWordBackward => delete_with(tree, &range, classes, |tree, caret| {
            resolve_word(tree, caret, Direction::Backward, classes)
        }),
        EditorAction::DeleteWordForward => delete_with(tree, &range, classes, |tree, caret| {
            resolve_word(tree, caret, Direction::Forward, classes)
        }),
        EditorAction::DeleteToLineStart => delete_with(tree, &range, classes, |tree, caret| {
            resolve_line(tree, caret, Direction::Backward, classes)
        }),
        EditorAction::DeleteToLineEnd => delete_with(tree, &range, classes, |tree, caret| {
            resolve_line(tree, caret, Direction::Forward, classes)
        }),
        EditorAction::DeleteSelection => {
            if range.is_collapsed() {
                None
            } else {
                wrap_as_deleted(tree, &range, classes)
            }
        }
        EditorAction::Undo | EditorAction::Redo => None,
    }
}

/// Replace the selection (if any) with `text` as an addition.
fn insert_text(
    tree: &mut MarkupTree,
    range: &TreeRange,
    text: &str,
    classes: &SpanClasses,
) -> Option<Point> {
    if text.is_empty() {
        return None;
    }
    let caret = if range.is_collapsed() {
        range.start.clone()
    } else {
        wrap_as_deleted(tree, range, classes).unwrap_or_else(|| range.start.clone())
    };
    Some(insert_as_addition(tree, &caret, text, classes))
}

/// Wrap the selection, or for a caret the range `resolve` finds next to it.
///
/// A resolved range can reach across struck content. Each visible run in it
/// gets its own deletion span, last run first so earlier runs stay valid.
/// The caret lands after the first run's span.
fn delete_with(
    tree: &mut MarkupTree,
    range: &TreeRange,
    classes: &SpanClasses,
    resolve: impl FnOnce(&MarkupTree, &Point) -> Option<TreeRange>,
) -> Option<Point> {
    if !range.is_collapsed() {
        return wrap_as_deleted(tree, range, classes);
    }
    let target = resolve(tree, &range.start)?;
    let mut runs = visible_runs(tree, &target, classes);
    let mut caret = None;
    while let Some(run) = runs.pop() {
        let mut keep: Vec<&mut Point> = runs
            .iter_mut()
            .flat_map(|r| [&mut r.start, &mut r.end])
            .collect();
        if let Some(next) = wrap_as_deleted_keeping(tree, &run, classes, &mut keep) {
            caret = Some(next);
        }
    }
    caret
}

/// Handle a keydown event.
///
/// Only the history shortcuts are bindings: Ctrl/Cmd+Z, Ctrl/Cmd+Shift+Z and
/// Ctrl+Y. Everything that edits text arrives as `beforeinput` instead.
pub fn handle_keydown(
    editor: &mut RedlineEditor,
    combo: &KeyCombo,
    is_mac: bool,
    now: Instant,
) -> KeydownResult {
    if !editor.lifecycle().is_editing() {
        return KeydownResult::NotHandled;
    }
    let mods = combo.modifiers;
    let primary = if is_mac { mods.meta } else { mods.ctrl };

    let action = match &combo.key {
        Key::Undo => Some(EditorAction::Undo),
        Key::Redo => Some(EditorAction::Redo),
        key if primary && !mods.alt && key.is_char('z') => Some(if mods.shift {
            EditorAction::Redo
        } else {
            EditorAction::Undo
        }),
        key if primary && !mods.alt && !mods.shift && !is_mac && key.is_char('y') => {
            Some(EditorAction::Redo)
        }
        key if key.is_navigation() || key.is_modifier() => return KeydownResult::PassThrough,
        _ => None,
    };

    match action {
        Some(action) => {
            execute_action(editor, &action, now);
            // Handled even when history is empty, so the browser's own
            // contenteditable undo never runs.
            KeydownResult::Handled
        }
        None => KeydownResult::NotHandled,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::actions::Modifiers;
    use crate::config::EditorConfig;
    use crate::lifecycle::Lifecycle;
    use crate::types::Point;

    fn editing(markup: &str) -> RedlineEditor {
        let mut editor = RedlineEditor::new(markup);
        editor.enable_editing().unwrap();
        editor
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_basic_edit_scenario() {
        let t0 = Instant::now();
        let mut editor = editing("Payment is due within 30 days.");
        editor.select_text_range(22, 24).unwrap();
        assert_eq!(editor.apply_at(&EditorAction::DeleteSelection, t0), EditOutcome::Applied);
        assert_eq!(editor.type_text("4", t0 + ms(50)), EditOutcome::Applied);
        assert_eq!(editor.type_text("5", t0 + ms(100)), EditOutcome::Applied);

        insta::assert_snapshot!(
            editor.markup(),
            @r#"Payment is due within <span class="tc-del">30</span><span class="tc-ins">45</span> days."#
        );
        assert_eq!(editor.extract_final_text(), "Payment is due within 45 days.");
        assert_eq!(editor.stats().additions, 1);
        assert_eq!(editor.stats().deletions, 1);
    }

    #[test]
    fn test_typing_over_selection_replaces_it() {
        let t0 = Instant::now();
        let mut editor = editing("Payment is due within 30 days.");
        editor.select_text_range(22, 24).unwrap();
        editor.type_text("45", t0);
        insta::assert_snapshot!(
            editor.markup(),
            @r#"Payment is due within <span class="tc-del">30</span><span class="tc-ins">45</span> days."#
        );
    }

    #[test]
    fn test_boundary_backspace_is_noop() {
        let t0 = Instant::now();
        let mut editor = editing("Hi");
        editor.set_caret(Point::new(vec![0], 0)).unwrap();
        assert_eq!(editor.backspace(t0), EditOutcome::NoOp);
        editor.set_caret(Point::new(vec![0], 2)).unwrap();
        assert_eq!(editor.delete_forward(t0), EditOutcome::NoOp);
        assert_eq!(editor.markup(), "Hi");
        assert!(!editor.can_undo());
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_insertion_coalescing() {
        let t0 = Instant::now();
        let mut editor = editing("Hello");
        for (i, c) in " there, friend".chars().enumerate() {
            // Far apart in time: batching must not matter for span shape.
            editor.type_text(&c.to_string(), t0 + Duration::from_secs(i as u64));
        }
        assert_eq!(editor.stats().additions, 1);
        insta::assert_snapshot!(
            editor.markup(),
            @r#"Hello<span class="tc-ins"> there, friend</span>"#
        );
        assert_eq!(editor.extract_final_text(), "Hello there, friend");
    }

    #[test]
    fn test_repeated_backspace_skips_deletions() {
        let t0 = Instant::now();
        let mut editor = editing("xyabc");
        editor.select_text_range(2, 5).unwrap();
        editor.apply_at(&EditorAction::DeleteSelection, t0);
        insta::assert_snapshot!(editor.markup(), @r#"xy<span class="tc-del">abc</span>"#);

        editor.backspace(t0 + ms(10));
        insta::assert_snapshot!(
            editor.markup(),
            @r#"x<span class="tc-del">y</span><span class="tc-del">abc</span>"#
        );
        assert_eq!(editor.visible_text(), "x");
        assert_eq!(editor.extract_final_text(), "x");
    }

    #[test]
    fn test_delete_then_word_delete() {
        let t0 = Instant::now();
        let mut editor = editing("The cat sat");
        editor.set_caret(Point::new(vec![0], 8)).unwrap();
        editor.apply_at(&EditorAction::DeleteWordBackward, t0);
        insta::assert_snapshot!(
            editor.markup(),
            @r#"The <span class="tc-del">cat </span>sat"#
        );
        assert_eq!(editor.extract_final_text(), "The sat");
    }

    #[test]
    fn test_word_delete_leaves_existing_deletions_alone() {
        let t0 = Instant::now();
        let mut editor = editing("ab<span class=\"tc-del\">zz</span>cd ef");
        editor.set_caret(Point::new(vec![0], 1)).unwrap();
        assert_eq!(
            editor.apply_at(&EditorAction::DeleteWordForward, t0),
            EditOutcome::Applied
        );
        insta::assert_snapshot!(
            editor.markup(),
            @r#"a<span class="tc-del">b</span><span class="tc-del">zz</span><span class="tc-del">cd </span>ef"#
        );
        assert_eq!(editor.stats().deletions, 3);
        assert_eq!(editor.extract_final_text(), "aef");
        assert_eq!(editor.selection().head, Point::root(2));
    }

    #[test]
    fn test_word_backspace_keeps_backend_strike() {
        let t0 = Instant::now();
        let mut editor = editing("The c<del class=\"diff-del\">old</del>at sat");
        editor.set_caret(Point::new(vec![2], 2)).unwrap();
        editor.apply_at(&EditorAction::DeleteWordBackward, t0);
        insta::assert_snapshot!(
            editor.markup(),
            @r#"The <span class="tc-del">c</span><del class="diff-del">old</del><span class="tc-del">at</span> sat"#
        );
        assert_eq!(editor.extract_final_text(), "The  sat");
    }

    #[test]
    fn test_delete_to_line_start_stops_at_break() {
        let t0 = Instant::now();
        let mut editor = editing("one<br>two three");
        editor.set_caret(Point::new(vec![2], 9)).unwrap();
        editor.apply_at(&EditorAction::DeleteToLineStart, t0);
        assert_eq!(editor.markup(), r#"one<br><span class="tc-del">two three</span>"#);
        assert_eq!(editor.extract_final_text(), "one\n");

        // Only struck text remains before the caret on this line.
        assert_eq!(
            editor.apply_at(&EditorAction::DeleteToLineStart, t0 + ms(10)),
            EditOutcome::NoOp
        );
    }

    #[test]
    fn test_delete_to_line_end() {
        let t0 = Instant::now();
        let mut editor = editing("one two<br>three");
        editor.set_caret(Point::new(vec![0], 3)).unwrap();
        editor.apply_at(&EditorAction::DeleteToLineEnd, t0);
        assert_eq!(
            editor.markup(),
            r#"one<span class="tc-del"> two</span><br>three"#
        );
        assert_eq!(editor.stats().deletions, 1);
    }

    #[test]
    fn test_unconfirmed_addition_retraction() {
        let t0 = Instant::now();
        let mut editor = editing("Note: ");
        editor.type_text("hello", t0);
        editor.select_text_range(6, 11).unwrap();
        editor.apply_at(&EditorAction::DeleteSelection, t0 + ms(10));

        assert_eq!(editor.markup(), "Note: ");
        assert_eq!(editor.stats().additions, 0);
        assert_eq!(editor.stats().deletions, 0);
        assert_eq!(editor.extract_final_text(), "Note: ");
    }

    #[test]
    fn test_backspacing_typed_text_retracts_it() {
        let t0 = Instant::now();
        let mut editor = editing("ab");
        editor.set_caret(Point::new(vec![0], 1)).unwrap();
        editor.type_text("X", t0);
        editor.type_text("Y", t0);
        editor.backspace(t0);
        editor.backspace(t0);
        assert_eq!(editor.markup(), "ab");
        // Next backspace strikes original text.
        editor.backspace(t0);
        insta::assert_snapshot!(editor.markup(), @r#"<span class="tc-del">a</span>b"#);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let t0 = Instant::now();
        let mut editor = editing("The cat sat");
        let s0 = editor.extract_final_text();

        editor.set_caret(Point::new(vec![0], 3)).unwrap();
        editor.type_text(" big", t0);
        editor.select_text_range(0, 3).unwrap();
        editor.apply_at(&EditorAction::DeleteSelection, t0 + ms(1000));
        editor.type_text("A", t0 + ms(2000));
        let sn = editor.extract_final_text();
        assert_eq!(sn, "A big cat sat");

        let mut undos = 0;
        while editor.undo().is_applied() {
            undos += 1;
        }
        assert_eq!(undos, 3);
        assert_eq!(editor.extract_final_text(), s0);
        assert!(!editor.is_modified());

        for _ in 0..undos {
            assert!(editor.redo().is_applied());
        }
        assert_eq!(editor.extract_final_text(), sn);
        assert_eq!(editor.redo(), EditOutcome::NoOp);
    }

    #[test]
    fn test_fast_typing_is_one_undo_step() {
        let t0 = Instant::now();
        let mut editor = editing("");
        for (i, c) in "quick".chars().enumerate() {
            editor.type_text(&c.to_string(), t0 + ms(i as u64 * 100));
        }
        assert!(editor.has_pending_batch());
        assert_eq!(editor.batch_deadline(), Some(t0 + ms(700)));
        assert!(editor.poll_batch(t0 + ms(700)));

        assert!(editor.undo().is_applied());
        assert_eq!(editor.markup(), "");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_undo_restores_caret() {
        let t0 = Instant::now();
        let mut editor = editing("abcdef");
        editor.set_caret(Point::new(vec![0], 3)).unwrap();
        editor.type_text("X", t0);
        editor.set_caret(Point::new(vec![2], 3)).unwrap();
        editor.type_text("Y", t0 + ms(1000));

        editor.undo();
        assert_eq!(editor.caret_text_offset(), 7);
        editor.undo();
        assert_eq!(editor.caret_text_offset(), 3);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let t0 = Instant::now();
        let mut editor = editing("abc");
        editor.type_text("d", t0);
        editor.undo();
        assert!(editor.can_redo());
        editor.type_text("e", t0 + ms(1000));
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_history_depth_cap() {
        let t0 = Instant::now();
        let config = EditorConfig {
            history_depth: 2,
            ..Default::default()
        };
        let mut editor = RedlineEditor::with_config("", config).unwrap();
        editor.enable_editing().unwrap();
        for i in 0..4u64 {
            editor.type_text("x", t0 + Duration::from_secs(i));
        }
        editor.flush_batch();
        assert!(editor.undo().is_applied());
        assert!(editor.undo().is_applied());
        assert_eq!(editor.undo(), EditOutcome::NoOp);
        assert_eq!(editor.extract_final_text(), "xx");
    }

    #[test]
    fn test_edits_ignored_outside_editing() {
        let t0 = Instant::now();
        let mut editor = RedlineEditor::new("abc");
        assert_eq!(editor.type_text("x", t0), EditOutcome::Ignored);
        editor.enable_editing().unwrap();
        editor.type_text("x", t0);
        editor.lock().unwrap();
        assert_eq!(editor.backspace(t0), EditOutcome::Ignored);
        assert_eq!(editor.undo(), EditOutcome::Ignored);
        assert_eq!(editor.extract_final_text(), "abcx");
    }

    #[test]
    fn test_reopen_clears_history_and_reset_restores_seed() {
        let t0 = Instant::now();
        let mut editor = editing("abc");
        editor.type_text("x", t0);
        editor.lock().unwrap();
        editor.reopen().unwrap();
        assert!(!editor.can_undo());
        assert!(editor.is_modified());

        editor.reset().unwrap();
        assert_eq!(editor.lifecycle(), Lifecycle::Seeded);
        assert_eq!(editor.markup(), "abc");
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_modified_callback() {
        let t0 = Instant::now();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut editor = editing("ab");
        let sink = Rc::clone(&seen);
        editor.set_on_modified(move |modified| sink.borrow_mut().push(modified));

        editor.type_text("c", t0);
        editor.undo();
        editor.redo();
        editor.reset().unwrap();
        assert_eq!(*seen.borrow(), vec![true, false, true, false]);
    }

    #[test]
    fn test_reseed_drops_pending_batch() {
        let t0 = Instant::now();
        let mut editor = editing("one");
        editor.type_text("!", t0);
        assert!(editor.has_pending_batch());
        editor.reseed("two &amp; three");
        assert!(!editor.has_pending_batch());
        assert_eq!(editor.lifecycle(), Lifecycle::Seeded);
        assert_eq!(editor.seed_markup(), "two &amp; three");
        assert_eq!(editor.extract_final_text(), "two & three");
    }

    #[test]
    fn test_paragraph_break_inserts_newline() {
        let t0 = Instant::now();
        let mut editor = editing("ab");
        editor.set_caret(Point::new(vec![0], 1)).unwrap();
        editor.apply_at(&EditorAction::InsertParagraph, t0);
        assert_eq!(editor.extract_final_text(), "a\nb");
    }

    #[test]
    fn test_keydown_history_bindings() {
        let t0 = Instant::now();
        let mut editor = editing("a");
        editor.type_text("b", t0);

        let undo = KeyCombo::with_modifiers(Key::character("z"), Modifiers::CTRL);
        assert_eq!(handle_keydown(&mut editor, &undo, false, t0), KeydownResult::Handled);
        assert_eq!(editor.markup(), "a");

        let redo = KeyCombo::with_modifiers(Key::character("Z"), Modifiers::META_SHIFT);
        assert_eq!(handle_keydown(&mut editor, &redo, true, t0), KeydownResult::Handled);
        assert_eq!(editor.extract_final_text(), "ab");

        let nav = KeyCombo::new(Key::ArrowLeft);
        assert_eq!(handle_keydown(&mut editor, &nav, false, t0), KeydownResult::PassThrough);
        let plain = KeyCombo::new(Key::character("q"));
        assert_eq!(handle_keydown(&mut editor, &plain, false, t0), KeydownResult::NotHandled);
    }
}
