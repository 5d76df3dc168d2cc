//! Debounce timer for committing the open undo batch.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use redline_core::Instant;

/// At most one scheduled commit. Dropping the timer cancels it.
#[derive(Default)]
pub struct BatchTimer {
    timeout: Option<Timeout>,
    /// Set while a commit is scheduled and has not fired.
    armed: Rc<Cell<bool>>,
}

impl BatchTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_fire` at `deadline`, replacing any commit already scheduled.
    pub fn schedule(&mut self, deadline: Instant, now: Instant, on_fire: impl FnOnce() + 'static) {
        self.cancel();
        let delay = deadline.saturating_duration_since(now);
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        tracing::trace!(target: "redline::history", millis, "scheduled batch commit");

        let armed = Rc::clone(&self.armed);
        armed.set(true);
        self.timeout = Some(Timeout::new(millis, move || {
            armed.set(false);
            on_fire();
        }));
    }

    pub fn cancel(&mut self) {
        self.armed.set(false);
        if let Some(timeout) = self.timeout.take() {
            timeout.cancel();
        }
    }

    /// Whether a commit is scheduled and still to fire.
    pub fn is_scheduled(&self) -> bool {
        self.armed.get()
    }
}
