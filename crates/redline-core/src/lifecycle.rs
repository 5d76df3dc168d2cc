//! Editor lifecycle state machine.

use serde::Serialize;

use crate::error::LifecycleError;

/// Where an editor instance is in its life.
///
/// ```text
/// Seeded --enable--> Editing --lock--> ReadOnly
///   ^                   ^                 |
///   |                   +-----reopen------+
///   +----------reset / reseed-------------+
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Lifecycle {
    /// Markup loaded, not yet editable.
    #[default]
    Seeded,
    /// Input is intercepted and turned into tracked changes.
    Editing,
    /// Content frozen, e.g. after acceptance.
    ReadOnly,
}

impl Lifecycle {
    pub fn is_editing(self) -> bool {
        self == Lifecycle::Editing
    }

    /// `Seeded -> Editing`. Enabling an editor that is already editing is
    /// allowed and changes nothing.
    pub fn enable(&mut self) -> Result<(), LifecycleError> {
        self.transition("enable editing", |from| {
            matches!(from, Lifecycle::Seeded | Lifecycle::Editing).then_some(Lifecycle::Editing)
        })
    }

    /// `Editing -> ReadOnly`.
    pub fn lock(&mut self) -> Result<(), LifecycleError> {
        self.transition("lock", |from| {
            matches!(from, Lifecycle::Editing | Lifecycle::ReadOnly).then_some(Lifecycle::ReadOnly)
        })
    }

    /// `ReadOnly -> Editing`.
    pub fn reopen(&mut self) -> Result<(), LifecycleError> {
        self.transition("reopen", |from| {
            (from == Lifecycle::ReadOnly).then_some(Lifecycle::Editing)
        })
    }

    /// Discard edits: `Editing | ReadOnly -> Seeded`.
    pub fn reset(&mut self) -> Result<(), LifecycleError> {
        self.transition("reset", |from| {
            matches!(from, Lifecycle::Editing | Lifecycle::ReadOnly).then_some(Lifecycle::Seeded)
        })
    }

    /// Load a different target. Allowed from every state.
    pub fn reseed(&mut self) {
        tracing::debug!(target: "redline::edit", from = ?*self, "reseeded");
        *self = Lifecycle::Seeded;
    }

    fn transition(
        &mut self,
        action: &'static str,
        next: impl FnOnce(Lifecycle) -> Option<Lifecycle>,
    ) -> Result<(), LifecycleError> {
        let from = *self;
        let to = next(from).ok_or(LifecycleError::InvalidTransition { from, action })?;
        if from != to {
            tracing::debug!(target: "redline::edit", ?from, ?to, "lifecycle transition");
        }
        *self = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = Lifecycle::default();
        assert_eq!(state, Lifecycle::Seeded);
        state.enable().unwrap();
        assert!(state.is_editing());
        state.lock().unwrap();
        assert_eq!(state, Lifecycle::ReadOnly);
        state.reopen().unwrap();
        assert_eq!(state, Lifecycle::Editing);
        state.reset().unwrap();
        assert_eq!(state, Lifecycle::Seeded);
    }

    #[test]
    fn test_illegal_transitions() {
        let mut state = Lifecycle::Seeded;
        assert_eq!(
            state.lock(),
            Err(LifecycleError::InvalidTransition {
                from: Lifecycle::Seeded,
                action: "lock",
            })
        );
        assert!(state.reopen().is_err());
        assert!(state.reset().is_err());
        assert_eq!(state, Lifecycle::Seeded);

        let mut state = Lifecycle::Editing;
        assert!(state.reopen().is_err());
    }

    #[test]
    fn test_reseed_from_anywhere() {
        for mut state in [Lifecycle::Seeded, Lifecycle::Editing, Lifecycle::ReadOnly] {
            state.reseed();
            assert_eq!(state, Lifecycle::Seeded);
        }
    }
}
