//! The track-changes editor instance.
//!
//! One `RedlineEditor` owns the markup of one editable container: its tree,
//! selection, history and lifecycle. Instances share nothing, so several can
//! be open side by side.

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::actions::EditorAction;
use crate::config::EditorConfig;
use crate::error::{ConfigError, LifecycleError, MarkupError};
use crate::execute::execute_action;
use crate::extract::extract_final_text;
use crate::html::markup_from_plain_text;
use crate::lifecycle::Lifecycle;
use crate::markup::{ChangeStats, LeafKind, MarkupTree, Node, SpanClasses};
use crate::types::{EditOutcome, Point, Selection};
use crate::undo::{History, Snapshot, UndoManager};

/// Callback fired with the modified flag after every change to the markup.
pub type ModifiedCallback = Box<dyn FnMut(bool)>;

/// The fields a host persists for a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSnapshot {
    /// Annotated markup, tracked changes included.
    pub markup: String,
    /// Text with every change accepted.
    pub final_text: String,
    /// Whether the markup differs from the seed.
    pub modified: bool,
}

pub struct RedlineEditor {
    config: EditorConfig,
    classes: SpanClasses,
    tree: MarkupTree,
    /// Seed markup after one parse/serialize pass, for the modified check.
    seed: String,
    selection: Selection,
    history: History,
    lifecycle: Lifecycle,
    modified: bool,
    on_modified: Option<ModifiedCallback>,
}

impl std::fmt::Debug for RedlineEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedlineEditor")
            .field("lifecycle", &self.lifecycle)
            .field("modified", &self.modified)
            .field("selection", &self.selection)
            .field("markup", &self.tree.to_markup())
            .finish_non_exhaustive()
    }
}

impl RedlineEditor {
    /// Create an editor seeded with `markup`, using the default config.
    pub fn new(markup: &str) -> Self {
        Self::build(markup, EditorConfig::default())
    }

    pub fn with_config(markup: &str, config: EditorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(markup, config))
    }

    /// Create an editor seeded with plain text.
    pub fn from_plain_text(text: &str, config: EditorConfig) -> Result<Self, ConfigError> {
        Self::with_config(&markup_from_plain_text(text), config)
    }

    fn build(markup: &str, config: EditorConfig) -> Self {
        let tree = MarkupTree::parse(markup);
        let seed = tree.to_markup();
        let selection = Selection::collapsed(tree.end_point());
        Self {
            classes: config.span_classes(),
            history: History::new(config.history_depth, config.batch_window()),
            config,
            tree,
            seed,
            selection,
            lifecycle: Lifecycle::Seeded,
            modified: false,
            on_modified: None,
        }
    }

    pub fn tree(&self) -> &MarkupTree {
        &self.tree
    }

    /// Current serialized markup.
    pub fn markup(&self) -> String {
        self.tree.to_markup()
    }

    pub fn seed_markup(&self) -> &str {
        &self.seed
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_on_modified(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_modified = Some(Box::new(callback));
    }

    pub fn clear_on_modified(&mut self) {
        self.on_modified = None;
    }

    // === Selection ===

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Set the selection, rejecting points that do not exist in the tree.
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), MarkupError> {
        self.check_point(&selection.anchor)?;
        self.check_point(&selection.head)?;
        self.selection = selection;
        Ok(())
    }

    pub fn set_caret(&mut self, point: Point) -> Result<(), MarkupError> {
        self.set_selection(Selection::collapsed(point))
    }

    /// Select between two text offsets (see [`MarkupTree::text_offset_of`]).
    pub fn select_text_range(&mut self, anchor: usize, head: usize) -> Result<(), MarkupError> {
        let len = self.text_len();
        for offset in [anchor, head] {
            if offset > len {
                return Err(MarkupError::TextOffsetOutOfBounds { offset, len });
            }
        }
        self.selection = Selection::new(
            self.tree.point_at_text_offset(anchor, &self.classes),
            self.tree.point_at_text_offset(head, &self.classes),
        );
        Ok(())
    }

    /// Caret position as a text offset.
    pub fn caret_text_offset(&self) -> usize {
        self.tree.text_offset_of(&self.selection.head, &self.classes)
    }

    fn text_len(&self) -> usize {
        self.tree.leaves(&self.classes).iter().map(|leaf| leaf.len()).sum()
    }

    fn check_point(&self, point: &Point) -> Result<(), MarkupError> {
        let len = self
            .tree
            .boundary_len(&point.path)
            .ok_or_else(|| MarkupError::InvalidPath(point.path.clone()))?;
        if point.offset > len {
            return Err(MarkupError::OffsetOutOfBounds {
                offset: point.offset,
                len,
            });
        }
        Ok(())
    }

    // === Editing ===

    /// Apply an action to the current selection at time `now`.
    pub fn apply_at(&mut self, action: &EditorAction, now: Instant) -> EditOutcome {
        execute_action(self, action, now)
    }

    /// Type `text` at the caret, replacing the selection if there is one.
    pub fn type_text(&mut self, text: &str, now: Instant) -> EditOutcome {
        self.apply_at(
            &EditorAction::Insert {
                text: text.to_string(),
            },
            now,
        )
    }

    pub fn backspace(&mut self, now: Instant) -> EditOutcome {
        self.apply_at(&EditorAction::DeleteBackward, now)
    }

    pub fn delete_forward(&mut self, now: Instant) -> EditOutcome {
        self.apply_at(&EditorAction::DeleteForward, now)
    }

    /// Run a tree edit with history recording and change notification.
    ///
    /// `edit` returns the new caret, or `None` when it did nothing.
    pub(crate) fn edit_with(
        &mut self,
        now: Instant,
        edit: impl FnOnce(&mut MarkupTree, &Selection, &SpanClasses) -> Option<Point>,
    ) -> EditOutcome {
        if !self.lifecycle.is_editing() {
            tracing::trace!(target: "redline::edit", lifecycle = ?self.lifecycle, "edit ignored");
            return EditOutcome::Ignored;
        }

        let before = self.current_snapshot();
        let Some(caret) = edit(&mut self.tree, &self.selection, &self.classes) else {
            return EditOutcome::NoOp;
        };
        self.selection = Selection::collapsed(caret);

        let after = self.tree.to_markup();
        if after == before.markup {
            return EditOutcome::NoOp;
        }
        self.history.record(before, now);
        self.update_modified(&after);
        EditOutcome::Applied
    }

    /// Restore the previous history entry.
    pub fn undo(&mut self) -> EditOutcome {
        if !self.lifecycle.is_editing() {
            return EditOutcome::Ignored;
        }
        let current = self.current_snapshot();
        match self.history.undo(current) {
            Some(snapshot) => {
                tracing::debug!(target: "redline::history", "undo");
                self.restore(snapshot);
                EditOutcome::Applied
            }
            None => EditOutcome::NoOp,
        }
    }

    /// Restore the most recently undone entry.
    pub fn redo(&mut self) -> EditOutcome {
        if !self.lifecycle.is_editing() {
            return EditOutcome::Ignored;
        }
        let current = self.current_snapshot();
        match self.history.redo(current) {
            Some(snapshot) => {
                tracing::debug!(target: "redline::history", "redo");
                self.restore(snapshot);
                EditOutcome::Applied
            }
            None => EditOutcome::NoOp,
        }
    }

    fn current_snapshot(&self) -> Snapshot {
        let caret = self
            .config
            .restore_caret
            .then(|| self.caret_text_offset());
        Snapshot::new(self.tree.to_markup(), caret)
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.tree = MarkupTree::parse(&snapshot.markup);
        let caret = match snapshot.caret {
            Some(offset) if self.config.restore_caret => {
                self.tree.point_at_text_offset(offset, &self.classes)
            }
            _ => self.tree.end_point(),
        };
        self.selection = Selection::collapsed(caret);
        self.update_modified(&snapshot.markup);
    }

    fn update_modified(&mut self, markup: &str) {
        self.modified = markup != self.seed;
        self.notify_modified();
    }

    fn notify_modified(&mut self) {
        let modified = self.modified;
        if let Some(callback) = self.on_modified.as_mut() {
            callback(modified);
        }
    }

    // === Batching ===

    /// Commit the open undo batch if its window has elapsed.
    pub fn poll_batch(&mut self, now: Instant) -> bool {
        self.history.poll(now)
    }

    /// When the open undo batch commits, if there is one.
    pub fn batch_deadline(&self) -> Option<Instant> {
        self.history.deadline()
    }

    pub fn has_pending_batch(&self) -> bool {
        self.history.has_pending()
    }

    /// Commit the open undo batch now.
    pub fn flush_batch(&mut self) {
        self.history.commit_pending();
    }

    // === Output ===

    /// Plain text with every tracked change accepted.
    pub fn extract_final_text(&self) -> String {
        extract_final_text(self.tree.children(), &self.classes)
    }

    /// Text the user currently sees, struck content left out.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        for leaf in self.tree.leaves(&self.classes) {
            if leaf.struck {
                continue;
            }
            match leaf.kind {
                LeafKind::LineBreak => out.push('\n'),
                LeafKind::Text(_) => {
                    if let Some(Node::Text(text)) = self.tree.node(&leaf.path) {
                        out.push_str(text);
                    }
                }
            }
        }
        out
    }

    pub fn snapshot(&self) -> RevisionSnapshot {
        RevisionSnapshot {
            markup: self.markup(),
            final_text: self.extract_final_text(),
            modified: self.modified,
        }
    }

    pub fn stats(&self) -> ChangeStats {
        self.tree.stats(&self.classes)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // === Lifecycle ===

    /// `Seeded -> Editing`.
    pub fn enable_editing(&mut self) -> Result<(), LifecycleError> {
        self.lifecycle.enable()
    }

    /// `Editing -> ReadOnly`. The open batch is committed.
    pub fn lock(&mut self) -> Result<(), LifecycleError> {
        self.lifecycle.lock()?;
        self.history.commit_pending();
        Ok(())
    }

    /// `ReadOnly -> Editing`, starting a fresh history.
    pub fn reopen(&mut self) -> Result<(), LifecycleError> {
        self.lifecycle.reopen()?;
        self.history.clear();
        Ok(())
    }

    /// Switch between `Editing` and `ReadOnly` from a host flag.
    pub fn set_read_only(&mut self, read_only: bool) -> Result<(), LifecycleError> {
        match (read_only, self.lifecycle) {
            (true, _) => self.lock(),
            (false, Lifecycle::ReadOnly) => self.reopen(),
            (false, _) => self.enable_editing(),
        }
    }

    /// Discard every edit and return to the seed.
    pub fn reset(&mut self) -> Result<(), LifecycleError> {
        self.lifecycle.reset()?;
        self.history.clear();
        self.tree = MarkupTree::parse(&self.seed);
        self.selection = Selection::collapsed(self.tree.end_point());
        self.modified = false;
        self.notify_modified();
        Ok(())
    }

    /// Load a different target. Any open batch is dropped, not committed.
    pub fn reseed(&mut self, markup: &str) {
        self.history.clear();
        self.tree = MarkupTree::parse(markup);
        self.seed = self.tree.to_markup();
        self.selection = Selection::collapsed(self.tree.end_point());
        self.modified = false;
        self.lifecycle.reseed();
    }
}

impl UndoManager for RedlineEditor {
    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn undo(&mut self) -> bool {
        RedlineEditor::undo(self).is_applied()
    }

    fn redo(&mut self) -> bool {
        RedlineEditor::redo(self).is_applied()
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}
