//! Undo/redo history with keystroke batching.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `History` - bounded snapshot stacks with a debounce-style batch commit

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// A full serialized state of the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub markup: String,
    /// Caret as a text offset, when caret restoration is enabled.
    pub caret: Option<usize>,
}

impl Snapshot {
    pub fn new(markup: impl Into<String>, caret: Option<usize>) -> Self {
        Self {
            markup: markup.into(),
            caret,
        }
    }
}

/// An open batch: the state before its first edit and when it was last
/// extended.
#[derive(Debug, Clone)]
struct PendingBatch {
    before: Snapshot,
    last_edit: Instant,
}

/// Undo and redo stacks of full snapshots.
///
/// Edits arriving within `batch_window` of each other share one undo entry:
/// the state before the first edit is held as pending and only pushed once
/// the window elapses with no further edit (see [`History::poll`]), or when
/// something forces a commit (undo, redo, locking the editor).
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_depth: usize,
    batch_window: Duration,
    pending: Option<PendingBatch>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(50, Duration::from_millis(300))
    }
}

impl History {
    pub fn new(max_depth: usize, batch_window: Duration) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            batch_window,
            pending: None,
        }
    }

    /// Record that an edit is about to change `before` into something new.
    ///
    /// Starts a batch, or extends the open one if the previous edit was within
    /// the batch window. Always invalidates redo.
    pub fn record(&mut self, before: Snapshot, now: Instant) {
        self.redo_stack.clear();
        let window = self.batch_window;
        if let Some(batch) = self
            .pending
            .as_mut()
            .filter(|batch| now.saturating_duration_since(batch.last_edit) < window)
        {
            batch.last_edit = now;
            tracing::trace!(target: "redline::history", "extended batch");
            return;
        }
        self.commit_pending();
        self.pending = Some(PendingBatch {
            before,
            last_edit: now,
        });
        tracing::trace!(target: "redline::history", "opened batch");
    }

    /// Commit the open batch if its window has elapsed. Returns true if an
    /// entry was pushed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let elapsed = self
            .pending
            .as_ref()
            .map(|batch| now.saturating_duration_since(batch.last_edit) >= self.batch_window)
            .unwrap_or(false);
        if elapsed {
            self.commit_pending();
        }
        elapsed
    }

    /// When the open batch will commit, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|batch| batch.last_edit + self.batch_window)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Push the open batch onto the undo stack now.
    pub fn commit_pending(&mut self) {
        let Some(batch) = self.pending.take() else {
            return;
        };
        self.undo_stack.push_back(batch.before);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
            tracing::trace!(target: "redline::history", "evicted oldest entry");
        }
        tracing::debug!(
            target: "redline::history",
            depth = self.undo_stack.len(),
            "committed undo entry"
        );
    }

    /// Drop the open batch without committing it.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Step back: returns the snapshot to restore, given the current state.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        self.commit_pending();
        let restored = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        Some(restored)
    }

    /// Step forward: returns the snapshot to restore, given the current state.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        self.commit_pending();
        let restored = self.redo_stack.pop()?;
        self.undo_stack.push_back(current);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.pending.is_some()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len() + usize::from(self.pending.is_some())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    fn snap(s: &str) -> Snapshot {
        Snapshot::new(s, None)
    }

    #[test]
    fn test_batch_commits_after_window() {
        let t0 = Instant::now();
        let mut history = History::new(50, WINDOW);

        history.record(snap("a"), t0);
        history.record(snap("ab"), t0 + Duration::from_millis(100));
        history.record(snap("abc"), t0 + Duration::from_millis(200));
        assert!(history.has_pending());
        assert!(!history.poll(t0 + Duration::from_millis(400)));
        assert!(history.poll(t0 + Duration::from_millis(500)));
        assert_eq!(history.undo_depth(), 1);

        // The batch restores the state before its first edit.
        assert_eq!(history.undo(snap("abcd")), Some(snap("a")));
    }

    #[test]
    fn test_separate_bursts_are_separate_entries() {
        let t0 = Instant::now();
        let mut history = History::new(50, WINDOW);

        history.record(snap("a"), t0);
        history.record(snap("ab"), t0 + Duration::from_secs(1));
        assert_eq!(history.undo_depth(), 2);

        assert_eq!(history.undo(snap("abc")), Some(snap("ab")));
        assert_eq!(history.undo(snap("ab")), Some(snap("a")));
        assert_eq!(history.undo(snap("a")), None);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let t0 = Instant::now();
        let mut history = History::new(50, WINDOW);
        history.record(snap("before"), t0);

        let restored = history.undo(snap("after"));
        assert_eq!(restored, Some(snap("before")));
        assert!(history.can_redo());
        assert_eq!(history.redo(snap("before")), Some(snap("after")));
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let t0 = Instant::now();
        let mut history = History::new(50, WINDOW);
        history.record(snap("a"), t0);
        history.undo(snap("b"));
        assert!(history.can_redo());

        history.record(snap("a"), t0 + Duration::from_secs(1));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_depth_cap_evicts_oldest() {
        let t0 = Instant::now();
        let mut history = History::new(3, WINDOW);
        for (i, s) in ["0", "1", "2", "3"].into_iter().enumerate() {
            history.record(snap(s), t0 + Duration::from_secs(i as u64));
        }
        history.commit_pending();
        assert_eq!(history.undo_depth(), 3);

        assert_eq!(history.undo(snap("4")), Some(snap("3")));
        assert_eq!(history.undo(snap("3")), Some(snap("2")));
        assert_eq!(history.undo(snap("2")), Some(snap("1")));
        // "0" was evicted.
        assert_eq!(history.undo(snap("1")), None);
    }

    #[test]
    fn test_empty_history_is_noop() {
        let mut history = History::default();
        assert!(!history.can_undo());
        assert_eq!(history.undo(snap("x")), None);
        assert_eq!(history.redo(snap("x")), None);
        assert_eq!(history.deadline(), None);
    }

    #[test]
    fn test_cancel_pending_drops_batch() {
        let t0 = Instant::now();
        let mut history = History::new(50, WINDOW);
        history.record(snap("a"), t0);
        assert_eq!(history.deadline(), Some(t0 + WINDOW));
        history.cancel_pending();
        assert!(!history.can_undo());
    }
}
